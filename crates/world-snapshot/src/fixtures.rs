//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // world-snapshot = { path = "../world-snapshot", features = ["test-fixtures"] }
//!
//! use world_snapshot::fixtures;
//!
//! let snapshot = fixtures::sample_snapshot();
//! ```

use crate::Snapshot;

/// Raw JSON of the sample snapshot.
pub const SAMPLE_STATE_JSON: &str = include_str!("../tests/fixtures/sample_state.json");

/// Returns a sample world snapshot from the fixtures file.
///
/// Contains:
/// - a 6x5 terrain grid using every terrain kind
/// - 4 agents in two tribes, one of them a leader, with opinions
/// - 5 items covering every item category
/// - 3 animals (carnivore, herbivore, other)
/// - nighttime
pub fn sample_snapshot() -> Snapshot {
    Snapshot::from_json(SAMPLE_STATE_JSON).expect("Failed to parse sample_state.json")
}
