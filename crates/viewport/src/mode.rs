//! Render modes: which attribute drives an agent's affiliation color.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use world_snapshot::AgentAttributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenderMode {
    /// Agents colored by sex.
    #[default]
    Terrain,
    /// Agents colored by tribe.
    Political,
    /// Agents colored by faith.
    Religious,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [
        RenderMode::Terrain,
        RenderMode::Political,
        RenderMode::Religious,
    ];

    /// The mode after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            RenderMode::Terrain => RenderMode::Political,
            RenderMode::Political => RenderMode::Religious,
            RenderMode::Religious => RenderMode::Terrain,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Terrain => "TERRAIN",
            RenderMode::Political => "POLITICAL",
            RenderMode::Religious => "RELIGIOUS",
        }
    }

    /// Raw affiliation color this mode reads, if it reads one at all.
    pub fn affiliation_color(self, attributes: &AgentAttributes) -> Option<&str> {
        match self {
            RenderMode::Terrain => None,
            RenderMode::Political => attributes.tribe_color.as_deref(),
            RenderMode::Religious => attributes.faith_color.as_deref(),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown render mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown render mode '{0}' (expected terrain, political or religious)")]
pub struct ParseModeError(pub String);

impl FromStr for RenderMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RenderMode::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}
