pub mod json;
pub mod table;

use std::time::Duration;

use crate::store::SnapshotMetadata;

pub fn print(snapshots: &[SnapshotMetadata], json_output: bool) -> Result<(), serde_json::Error> {
    if json_output {
        println!("{}", json::render(snapshots)?);
    } else {
        let now = chrono::Utc::now().timestamp_millis();
        print!("{}", table::render(snapshots, now));
    }
    Ok(())
}

/// Keep snapshots taken within `window` of `now_millis`.
pub fn within(
    snapshots: Vec<SnapshotMetadata>,
    window: Duration,
    now_millis: i64,
) -> Vec<SnapshotMetadata> {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    let cutoff = now_millis.saturating_sub(window_ms);
    snapshots
        .into_iter()
        .filter(|s| s.timestamp >= cutoff)
        .collect()
}
