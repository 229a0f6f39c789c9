use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::ActionError;
use crate::store::{SnapshotId, SnapshotStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Snapshot the current file before overwriting it.
    pub backup: bool,
    /// Overwrite even if the backup snapshot could not be taken.
    pub force: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        RestoreOptions {
            backup: true,
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub path: PathBuf,
    /// The original file was gone and has been created from the snapshot.
    pub recreated: bool,
    pub backup: Option<SnapshotId>,
}

fn backup_name(snapshot_name: &str) -> String {
    format!("Auto snapshot before restoring {snapshot_name}")
}

/// Write a snapshot's content back to its original path.
pub fn restore(
    store: &SnapshotStore,
    id: &SnapshotId,
    options: RestoreOptions,
) -> Result<RestoreOutcome, ActionError> {
    let snapshot = store.get(id)?;
    // read before touching anything so a broken blob aborts cleanly
    let content = store.read_content(id)?;
    let target = PathBuf::from(&snapshot.original_file_path);

    if !target.exists() {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ActionError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_content(&target, &content)?;
        info!("recreated {} from snapshot {id}", target.display());
        return Ok(RestoreOutcome {
            path: target,
            recreated: true,
            backup: None,
        });
    }

    let mut backup = None;
    if options.backup {
        match store.create(&target, &backup_name(&snapshot.name)) {
            Ok(backup_id) => {
                info!("backup snapshot {backup_id} taken of {}", target.display());
                backup = Some(backup_id);
            }
            Err(source) if options.force => {
                warn!("backup of {} failed, restoring anyway: {source}", target.display());
            }
            Err(source) => {
                return Err(ActionError::BackupFailed {
                    path: target,
                    source,
                })
            }
        }
    }

    write_content(&target, &content)?;
    info!("restored {} to snapshot {id}", target.display());

    Ok(RestoreOutcome {
        path: target,
        recreated: false,
        backup,
    })
}

fn write_content(target: &Path, content: &[u8]) -> Result<(), ActionError> {
    fs::write(target, content).map_err(|source| ActionError::Write {
        path: target.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ErrorKind;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SnapshotStore, PathBuf) {
        let dir = TempDir::new().unwrap();
        let mut store = SnapshotStore::new(dir.path().join(".snapkeep"));
        store.initialize().unwrap();
        let file = dir.path().join("notes.md");
        fs::write(&file, "original\n").unwrap();
        (dir, store, file)
    }

    #[test]
    fn restore_overwrites_and_backs_up() {
        let (_dir, store, file) = setup();
        let id = store.create(&file, "v1").unwrap();
        fs::write(&file, "edited\n").unwrap();

        let outcome = restore(&store, &id, RestoreOptions::default()).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "original\n");
        assert!(!outcome.recreated);
        let backup = outcome.backup.unwrap();
        assert_eq!(store.read_content(&backup).unwrap(), b"edited\n");
        assert_eq!(
            store.get(&backup).unwrap().name,
            "Auto snapshot before restoring v1"
        );

        let names: Vec<_> = store
            .list_by_file(&file)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Auto snapshot before restoring v1", "v1"]);
    }

    #[test]
    fn restore_without_backup_takes_no_snapshot() {
        let (_dir, store, file) = setup();
        let id = store.create(&file, "v1").unwrap();
        fs::write(&file, "edited\n").unwrap();

        let options = RestoreOptions {
            backup: false,
            force: false,
        };
        let outcome = restore(&store, &id, options).unwrap();

        assert!(outcome.backup.is_none());
        assert_eq!(store.list_all().unwrap().len(), 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), "original\n");
    }

    #[test]
    fn missing_original_is_recreated() {
        let (dir, store, _) = setup();
        let nested = dir.path().join("src").join("lib.rs");
        fs::create_dir_all(nested.parent().unwrap()).unwrap();
        fs::write(&nested, "fn main() {}\n").unwrap();
        let id = store.create(&nested, "v1").unwrap();
        fs::remove_dir_all(dir.path().join("src")).unwrap();

        let outcome = restore(&store, &id, RestoreOptions::default()).unwrap();

        assert!(outcome.recreated);
        assert!(outcome.backup.is_none());
        assert_eq!(fs::read_to_string(&nested).unwrap(), "fn main() {}\n");
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn broken_blob_leaves_file_untouched() {
        let (_dir, store, file) = setup();
        let id = store.create(&file, "v1").unwrap();
        fs::remove_file(store.get(&id).unwrap().content_storage_path).unwrap();
        fs::write(&file, "edited\n").unwrap();

        let err = restore(&store, &id, RestoreOptions::default()).unwrap_err();

        assert!(matches!(&err, ActionError::Store(e) if e.kind() == ErrorKind::Storage));
        assert_eq!(fs::read_to_string(&file).unwrap(), "edited\n");
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    fn reject_inserts(store: &SnapshotStore) {
        let conn = rusqlite::Connection::open(store.index_path()).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_inserts BEFORE INSERT ON snapshots
             BEGIN SELECT RAISE(ABORT, 'index is read-only'); END;",
        )
        .unwrap();
    }

    #[test]
    fn failed_backup_aborts() {
        let (_dir, store, file) = setup();
        let id = store.create(&file, "v1").unwrap();
        fs::write(&file, "edited\n").unwrap();
        reject_inserts(&store);

        let err = restore(&store, &id, RestoreOptions::default()).unwrap_err();

        assert!(matches!(err, ActionError::BackupFailed { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), "edited\n");
    }

    #[test]
    fn forced_restore_continues_without_backup() {
        let (_dir, store, file) = setup();
        let id = store.create(&file, "v1").unwrap();
        fs::write(&file, "edited\n").unwrap();
        reject_inserts(&store);

        let options = RestoreOptions {
            backup: true,
            force: true,
        };
        let outcome = restore(&store, &id, options).unwrap();

        assert!(outcome.backup.is_none());
        assert_eq!(fs::read_to_string(&file).unwrap(), "original\n");
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (_dir, store, _) = setup();
        let err = restore(&store, &SnapshotId::from("nope"), RestoreOptions::default())
            .unwrap_err();
        assert!(matches!(&err, ActionError::Store(e) if e.kind() == ErrorKind::NotFound));
    }
}
