use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::ActionError;
use crate::store::{SnapshotId, SnapshotMetadata, SnapshotStore};

/// `<stem>_<name>.<ext>` with every non-alphanumeric character of the
/// snapshot name replaced by `_`. Files without an extension get `txt`.
pub fn suggested_export_name(snapshot: &SnapshotMetadata) -> String {
    let file_name = snapshot.file_name();
    let path = Path::new(&file_name);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "txt".to_string());
    let label: String = snapshot
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    format!("{stem}_{label}.{extension}")
}

/// Write snapshot content to `destination`, or to the suggested name in the
/// current directory. Returns the path written.
pub fn export(
    store: &SnapshotStore,
    id: &SnapshotId,
    destination: Option<&Path>,
) -> Result<PathBuf, ActionError> {
    let snapshot = store.get(id)?;
    let content = store.read_content(id)?;

    let target = match destination {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(suggested_export_name(&snapshot)),
    };

    fs::write(&target, &content).map_err(|source| ActionError::Write {
        path: target.clone(),
        source,
    })?;

    info!("exported snapshot {id} to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn metadata(path: &str, name: &str) -> SnapshotMetadata {
        SnapshotMetadata {
            id: "id".into(),
            name: name.into(),
            original_file_path: path.into(),
            timestamp: 0,
            file_size: 0,
            content_hash: "00000000".into(),
            content_storage_path: PathBuf::from("/s/content/id.snapshot"),
        }
    }

    #[test]
    fn suggested_name_sanitizes_label() {
        let meta = metadata("/work/src/main.rs", "before refactor (v2)!");
        assert_eq!(suggested_export_name(&meta), "main_before_refactor__v2__.rs");
    }

    #[test]
    fn suggested_name_defaults_extension() {
        let meta = metadata("/work/Makefile", "v1");
        assert_eq!(suggested_export_name(&meta), "Makefile_v1.txt");

        let dotfile = metadata("/home/u/.bashrc", "v1");
        assert_eq!(suggested_export_name(&dotfile), ".bashrc_v1.txt");
    }

    #[test]
    fn non_ascii_label_characters_become_underscores() {
        let meta = metadata("/work/a.txt", "café");
        assert_eq!(suggested_export_name(&meta), "a_caf_.txt");
    }

    #[test]
    fn export_writes_snapshot_bytes() {
        let dir = TempDir::new().unwrap();
        let mut store = SnapshotStore::new(dir.path().join(".snapkeep"));
        store.initialize().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "captured\n").unwrap();
        let id = store.create(&file, "v1").unwrap();
        fs::write(&file, "changed\n").unwrap();

        let out = dir.path().join("exported.txt");
        let written = export(&store, &id, Some(&out)).unwrap();

        assert_eq!(written, out);
        assert_eq!(fs::read_to_string(&out).unwrap(), "captured\n");
    }

    #[test]
    fn export_to_missing_directory_is_write_error() {
        let dir = TempDir::new().unwrap();
        let mut store = SnapshotStore::new(dir.path().join(".snapkeep"));
        store.initialize().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        let id = store.create(&file, "v1").unwrap();

        let out = dir.path().join("no").join("such").join("dir.txt");
        let err = export(&store, &id, Some(&out)).unwrap_err();
        assert!(matches!(err, ActionError::Write { .. }));
    }
}
