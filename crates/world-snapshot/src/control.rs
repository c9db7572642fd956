//! Control commands sent from the viewer to the simulation.
//!
//! Commands are fire-and-forget: the viewer never waits for or interprets a
//! reply. On the wire each command is one JSON object tagged by `type`.

use serde::{Deserialize, Serialize};

/// A request for the simulation to change how it runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Toggle between paused and running.
    Pause,
    /// Change the simulation speed multiplier.
    SetSpeed { value: f32 },
    /// Run an evolution step immediately.
    ForceEvolution,
}

impl ControlCommand {
    /// Slowest speed the simulation accepts.
    pub const MIN_SPEED: f32 = 0.01;
    /// Fastest speed the simulation accepts.
    pub const MAX_SPEED: f32 = 2.0;

    /// Builds a speed command, clamped to the accepted range.
    pub fn set_speed(value: f32) -> Self {
        let value = if value.is_finite() {
            value.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
        } else {
            1.0
        };
        Self::SetSpeed { value }
    }

    /// Serializes this command as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(
            ControlCommand::Pause.to_json_line().unwrap(),
            r#"{"type":"pause"}"#
        );
        assert_eq!(
            ControlCommand::ForceEvolution.to_json_line().unwrap(),
            r#"{"type":"force_evolution"}"#
        );
        assert_eq!(
            ControlCommand::SetSpeed { value: 0.5 }.to_json_line().unwrap(),
            r#"{"type":"set_speed","value":0.5}"#
        );
    }

    #[test]
    fn test_parse_command() {
        let cmd: ControlCommand = serde_json::from_str(r#"{"type":"set_speed","value":1.5}"#).unwrap();
        assert_eq!(cmd, ControlCommand::SetSpeed { value: 1.5 });
    }

    #[test]
    fn test_set_speed_clamps() {
        assert_eq!(ControlCommand::set_speed(10.0), ControlCommand::SetSpeed { value: 2.0 });
        assert_eq!(ControlCommand::set_speed(0.0), ControlCommand::SetSpeed { value: 0.01 });
        assert_eq!(ControlCommand::set_speed(f32::NAN), ControlCommand::SetSpeed { value: 1.0 });
    }
}
