//! Control egress: appends simulation commands to a JSON-lines file.
//!
//! The simulation tails the file; the viewer never reads it back.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use viewport::ControlSink;
use world_snapshot::ControlCommand;

/// Errors that can occur while writing a command.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("failed to write command file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Writes each command as one line of JSON.
#[derive(Debug, Clone)]
pub struct JsonlControlSink {
    path: PathBuf,
}

impl JsonlControlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one command, creating the file and its directory if needed.
    pub fn append(&self, command: &ControlCommand) -> Result<(), ControlError> {
        let line = command.to_json_line()?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

impl ControlSink for JsonlControlSink {
    fn send(&mut self, command: ControlCommand) {
        match self.append(&command) {
            Ok(()) => tracing::info!("Sent {:?} to {:?}", command, self.path),
            Err(e) => tracing::error!("Failed to send {:?}: {}", command, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_one_line_per_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("commands.jsonl");
        let mut sink = JsonlControlSink::new(&path);

        sink.send(ControlCommand::Pause);
        sink.send(ControlCommand::set_speed(0.5));
        sink.send(ControlCommand::ForceEvolution);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"type":"pause"}"#,
                r#"{"type":"set_speed","value":0.5}"#,
                r#"{"type":"force_evolution"}"#,
            ]
        );
    }

    #[test]
    fn test_append_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlControlSink::new(dir.path());

        let err = sink.append(&ControlCommand::Pause).unwrap_err();
        assert!(matches!(err, ControlError::Io(_)));
    }
}
