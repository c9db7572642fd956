//! Shared snapshot types for the world viewer.
//!
//! This crate contains pure data structures with no rendering logic: the
//! world snapshot pushed by the simulation and the control commands sent
//! back to it. It is a dependency for all other crates in the workspace.

pub mod control;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use control::ControlCommand;
pub use snapshot::{
    AgentAttributes, AgentSnapshot, AnimalClass, AnimalSnapshot, ItemSnapshot, Snapshot,
    SnapshotError, TerrainKind,
};
