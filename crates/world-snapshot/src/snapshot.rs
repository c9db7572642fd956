//! Snapshot Types
//!
//! Serialization structs for the world state pushed by the simulation.
//!
//! A snapshot is an immutable description of the full world at one point in
//! time. Consumers never merge snapshots: each new one replaces the last.
//! Every collection is optional on the wire and defaults to empty, so a
//! partial message still deserializes.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Errors that can occur while reading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    /// The snapshot contents were not valid JSON for this schema.
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Treats an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn default_is_day() -> bool {
    true
}

/// Full world snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u32>,
    /// Day/night flag; a snapshot without it is treated as daytime.
    #[serde(default = "default_is_day")]
    pub is_day: bool,
    /// Terrain grid, indexed `terrain[y][x]`.
    #[serde(default, deserialize_with = "nullable")]
    pub terrain: Vec<Vec<TerrainKind>>,
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<ItemSnapshot>,
    #[serde(default, deserialize_with = "nullable")]
    pub agents: Vec<AgentSnapshot>,
    #[serde(default, deserialize_with = "nullable")]
    pub animals: Vec<AnimalSnapshot>,
    /// Event log, oldest first. Grows monotonically across snapshots.
    #[serde(default, deserialize_with = "nullable")]
    pub logs: Vec<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            time_step: None,
            generation: None,
            is_day: true,
            terrain: Vec::new(),
            items: Vec::new(),
            agents: Vec::new(),
            animals: Vec::new(),
            logs: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Parses a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a snapshot file.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Looks up an agent by id.
    pub fn agent(&self, agent_id: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    /// Grid dimensions as `(width, height)` in cells.
    ///
    /// Prefers the explicit fields and falls back to the terrain grid.
    pub fn dimensions(&self) -> (usize, usize) {
        let width = self
            .width
            .map(|w| w as usize)
            .unwrap_or_else(|| self.terrain.iter().map(Vec::len).max().unwrap_or(0));
        let height = self
            .height
            .map(|h| h as usize)
            .unwrap_or(self.terrain.len());
        (width, height)
    }

    /// The most recent log line, if any.
    pub fn latest_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}

/// Kind of terrain in one grid cell.
///
/// Encoded on the wire as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TerrainKind {
    Water,
    Sand,
    Grass,
    Forest,
    Mountain,
    Snow,
    /// Any code this viewer does not know about.
    Unknown(i64),
}

impl From<i64> for TerrainKind {
    fn from(code: i64) -> Self {
        match code {
            0 => TerrainKind::Water,
            1 => TerrainKind::Sand,
            2 => TerrainKind::Grass,
            3 => TerrainKind::Forest,
            4 => TerrainKind::Mountain,
            5 => TerrainKind::Snow,
            other => TerrainKind::Unknown(other),
        }
    }
}

impl From<TerrainKind> for i64 {
    fn from(kind: TerrainKind) -> Self {
        match kind {
            TerrainKind::Water => 0,
            TerrainKind::Sand => 1,
            TerrainKind::Grass => 2,
            TerrainKind::Forest => 3,
            TerrainKind::Mountain => 4,
            TerrainKind::Snow => 5,
            TerrainKind::Unknown(code) => code,
        }
    }
}

/// Item lying on the ground
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: BTreeSet<String>,
}

/// Free-form agent attributes.
///
/// Only the fields the viewer draws are typed; everything else is kept in
/// `extra` for detail panels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    /// CSS-style hex color of the agent's tribe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tribe_color: Option<String>,
    /// CSS-style hex color of the agent's faith.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faith_color: Option<String>,
    #[serde(
        default,
        alias = "personality_vector",
        skip_serializing_if = "Option::is_none"
    )]
    pub personality: Option<Vec<f32>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AgentAttributes {
    pub fn is_male(&self) -> bool {
        self.gender.eq_ignore_ascii_case("male")
    }
}

/// Agent snapshot
///
/// Opinions are read from a top-level `opinions` map or from the
/// simulation's nested `qalb.opinions`; top-level entries win on conflict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "AgentWire")]
pub struct AgentSnapshot {
    /// Stable identity across snapshots.
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub attributes: AgentAttributes,
    /// Signed opinion of other agents, keyed by their id.
    pub opinions: BTreeMap<String, f32>,
}

/// Agent as it appears on the wire.
#[derive(Deserialize)]
struct AgentWire {
    id: String,
    x: f32,
    y: f32,
    #[serde(default, deserialize_with = "nullable")]
    attributes: AgentAttributes,
    #[serde(default, deserialize_with = "nullable")]
    opinions: BTreeMap<String, f32>,
    #[serde(default, deserialize_with = "nullable")]
    qalb: InnerState,
}

/// The agent's inner state block; only its opinions are read.
#[derive(Default, Deserialize)]
struct InnerState {
    #[serde(default, deserialize_with = "nullable")]
    opinions: BTreeMap<String, f32>,
}

impl From<AgentWire> for AgentSnapshot {
    fn from(wire: AgentWire) -> Self {
        let mut opinions = wire.qalb.opinions;
        opinions.extend(wire.opinions);
        Self {
            id: wire.id,
            x: wire.x,
            y: wire.y,
            attributes: wire.attributes,
            opinions,
        }
    }
}

impl AgentSnapshot {
    /// An agent leads its group when the group's leader id is its own.
    pub fn is_leader(&self) -> bool {
        self.attributes.leader_id.as_deref() == Some(self.id.as_str())
    }
}

/// Broad dietary class of an animal species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimalClass {
    Carnivore,
    Herbivore,
    Other,
}

/// Animal snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl AnimalSnapshot {
    pub fn class(&self) -> AnimalClass {
        match self.kind.to_ascii_lowercase().as_str() {
            "carnivore" => AnimalClass::Carnivore,
            "herbivore" => AnimalClass::Herbivore,
            _ => AnimalClass::Other,
        }
    }
}
