use std::fs;
use std::io;
use std::path::PathBuf;

use super::ActionError;
use crate::store::diff::{compare_contents, DiffResult};
use crate::store::{SnapshotId, SnapshotMetadata, SnapshotStore};

#[derive(Debug, Clone)]
pub struct Comparison {
    pub snapshot: SnapshotMetadata,
    pub diff: DiffResult,
}

/// Diff a snapshot (old side) against the current content of its file (new side).
pub fn diff_with_current(
    store: &SnapshotStore,
    id: &SnapshotId,
    context: usize,
) -> Result<Comparison, ActionError> {
    let snapshot = store.get(id)?;
    let old = store.read_content(id)?;

    let current_path = PathBuf::from(&snapshot.original_file_path);
    let new = match fs::read(&current_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ActionError::OriginalMissing { path: current_path })
        }
        Err(source) => {
            return Err(ActionError::Read {
                path: current_path,
                source,
            })
        }
    };

    let old_label = format!("{} ({})", snapshot.file_name(), snapshot.name);
    let diff = compare_contents(
        &old,
        &new,
        &old_label,
        &snapshot.original_file_path,
        context,
    );

    Ok(Comparison { snapshot, diff })
}
