//! Terminal table rendering for snapshot listings.
//!
//! Formats output grouped by original file:
//! - Files sorted by path
//! - Snapshots within a file newest first, as returned by the store
//! - Per-file count and total captured size
//! - Local capture time and relative age per snapshot

use std::collections::BTreeMap;

use crate::store::SnapshotMetadata;
use crate::util::{format_bytes, format_timestamp, relative_age, truncate};

pub fn render(snapshots: &[SnapshotMetadata], now_millis: i64) -> String {
    if snapshots.is_empty() {
        return String::from("No snapshots found.\n");
    }

    let mut by_file: BTreeMap<&str, Vec<&SnapshotMetadata>> = BTreeMap::new();
    for snapshot in snapshots {
        by_file
            .entry(snapshot.original_file_path.as_str())
            .or_default()
            .push(snapshot);
    }

    let mut output = String::new();

    for (file, entries) in &by_file {
        let total: u64 = entries.iter().map(|s| s.file_size).sum();
        let noun = if entries.len() == 1 { "snapshot" } else { "snapshots" };

        output.push_str(&format!("\n{file} ({} {noun}, {})\n", entries.len(), format_bytes(total)));
        output.push_str(&"-".repeat(104));
        output.push('\n');

        for snapshot in entries {
            output.push_str(&format!(
                "  {:<22} {:<30} {:<19} {:>10} {:>10} {:>8}\n",
                truncate(snapshot.id.as_str(), 22),
                truncate(&snapshot.name, 30),
                format_timestamp(snapshot.timestamp),
                relative_age(snapshot.timestamp, now_millis),
                format_bytes(snapshot.file_size),
                snapshot.content_hash
            ));
        }
    }

    output
}
