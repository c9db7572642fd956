//! Configuration loading for the viewport.
//!
//! Every setting has a default; a TOML file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete viewport configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Camera transform settings
    #[serde(default)]
    pub camera: CameraConfig,
    /// Pointer gesture settings
    #[serde(default)]
    pub pointer: PointerConfig,
    /// Scene drawing thresholds
    #[serde(default)]
    pub render: RenderConfig,
}

impl ViewportConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every size, scale and distance can drive a valid transform.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        let positive = [
            ("camera.cell_size", camera.cell_size),
            ("camera.initial_scale", camera.initial_scale),
            ("camera.min_scale", camera.min_scale),
            ("camera.max_scale", camera.max_scale),
            ("camera.follow_scale", camera.follow_scale),
            ("camera.zoom_step", camera.zoom_step),
        ];
        let non_negative = [
            ("camera.wheel_sensitivity", camera.wheel_sensitivity),
            ("pointer.click_threshold", self.pointer.click_threshold),
            ("pointer.select_radius", self.pointer.select_radius),
        ];

        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }

    /// Returns this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Camera transform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Edge length of one grid cell at scale 1, in pixels
    pub cell_size: f32,
    /// Scale on startup and after a view reset
    pub initial_scale: f32,
    /// Most zoomed-out scale
    pub min_scale: f32,
    /// Most zoomed-in scale
    pub max_scale: f32,
    /// Scale the camera jumps to when an agent is selected
    pub follow_scale: f32,
    /// Scale change per wheel pixel, relative to the current scale
    pub wheel_sensitivity: f32,
    /// Factor applied by one discrete zoom step
    pub zoom_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            cell_size: 12.0,
            initial_scale: 1.5,
            min_scale: 0.5,
            max_scale: 10.0,
            follow_scale: 3.5,
            wheel_sensitivity: 0.001,
            zoom_step: 1.2,
        }
    }
}

/// Pointer gesture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Press-to-release distance in pixels below which a gesture is a click
    pub click_threshold: f32,
    /// Selection radius around an agent's center, in cells
    pub select_radius: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            click_threshold: 5.0,
            select_radius: 0.8,
        }
    }
}

/// Scene drawing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Grid lines are drawn only above this scale
    pub grid_min_scale: f32,
    /// Agent name labels are drawn only above this scale
    pub label_min_scale: f32,
    /// Opinions at or below this magnitude get no relationship line
    pub opinion_threshold: f32,
    /// Opinion magnitude at which a relationship line is fully opaque
    pub opinion_full_strength: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            grid_min_scale: 2.0,
            label_min_scale: 2.5,
            opinion_threshold: 5.0,
            opinion_full_strength: 50.0,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value that would leave the viewport unusable
    #[error("invalid config value {field} = {value}")]
    Invalid { field: &'static str, value: f32 },
    /// Error writing TOML config
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ViewportConfig::default();

        assert_eq!(config.camera.cell_size, 12.0);
        assert_eq!(config.camera.min_scale, 0.5);
        assert_eq!(config.camera.max_scale, 10.0);
        assert_eq!(config.pointer.click_threshold, 5.0);
        assert_eq!(config.render.opinion_threshold, 5.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            [camera]
            cell_size = 10.0
            follow_scale = 3.0

            [pointer]
            select_radius = 1.5
        "#;

        let config = ViewportConfig::from_str(toml).unwrap();

        assert_eq!(config.camera.cell_size, 10.0);
        assert_eq!(config.camera.follow_scale, 3.0);
        assert_eq!(config.camera.initial_scale, 1.5);
        assert_eq!(config.pointer.select_radius, 1.5);
        assert_eq!(config.pointer.click_threshold, 5.0);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ViewportConfig::from_str("").unwrap();
        assert_eq!(config, ViewportConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ViewportConfig::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[camera]"));
        assert_eq!(ViewportConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ViewportConfig::from_str("[camera\ncell_size = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_non_positive_scales_rejected() {
        let err = ViewportConfig::from_str("[camera]\nmin_scale = 0.0\ninitial_scale = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "camera.initial_scale",
                ..
            }
        ));

        let err = ViewportConfig::from_str("[camera]\ncell_size = -4.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.cell_size", .. }));

        let err = ViewportConfig::from_str("[pointer]\nclick_threshold = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pointer.click_threshold", .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nlabel_min_scale = 4.0").unwrap();

        let config = ViewportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.render.label_min_scale, 4.0);
    }
}
