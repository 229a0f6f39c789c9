//! Snapshot persistence.
//!
//! Persists file snapshots under a single root directory:
//! - snapshots.index: SQLite table with one row of metadata per snapshot
//! - content/<id>.snapshot: the captured bytes, one file per snapshot
//!
//! Supports:
//! - Capturing a file into a new snapshot
//! - Listing snapshots for one file or for the whole workspace, newest first
//! - Reading snapshot content and metadata by id
//! - Deleting a snapshot (metadata first, blob best-effort)

pub mod checksum;
pub mod diff;
pub mod error;
mod snapshot;

use std::fmt;
use std::path::PathBuf;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use error::{ErrorKind, Operation, StoreError, StoreResult};
pub use snapshot::{BlobCleanup, SnapshotStore};

const ID_SUFFIX_LEN: usize = 12;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque snapshot identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Time-ordered prefix (epoch millis in base 36) plus a random suffix.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut rng = rand::thread_rng();
        let mut id = to_base36(millis);
        for _ in 0..ID_SUFFIX_LEN {
            id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
        }
        SnapshotId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SnapshotId {
    fn from(s: String) -> Self {
        SnapshotId(s)
    }
}

impl From<&str> for SnapshotId {
    fn from(s: &str) -> Self {
        SnapshotId(s.to_string())
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Snapshot metadata stored in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub id: SnapshotId,
    pub name: String,
    pub original_file_path: String,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub file_size: u64,
    pub content_hash: String,
    pub content_storage_path: PathBuf,
}

impl SnapshotMetadata {
    /// File name component of the original path, for display.
    pub fn file_name(&self) -> String {
        std::path::Path::new(&self.original_file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.original_file_path.clone())
    }
}
