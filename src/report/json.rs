//! JSON output for snapshot listings.
//!
//! Serializes SnapshotMetadata to JSON for scripting and piping.

use crate::store::SnapshotMetadata;

pub fn render(snapshots: &[SnapshotMetadata]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshots)
}
