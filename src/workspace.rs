//! Workspace integration.
//!
//! Opens the snapshot store under the workspace and, for git checkouts,
//! makes sure the storage directory is ignored. The `.gitignore` edit is
//! offered once: a marker file in the storage root records that it was
//! handled, so removing the entry later sticks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::platform;
use crate::store::{SnapshotStore, StoreResult};

pub const GITIGNORE_MARKER: &str = ".gitignore-handled";
const GITIGNORE_COMMENT: &str = "# snapkeep snapshots";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitignoreSetup {
    NotARepository,
    OutsideWorkspace,
    AlreadyHandled,
    AlreadyListed,
    Appended,
    Created,
}

/// Construct and initialize the store for `config`'s workspace.
pub fn open_store(config: &Config) -> StoreResult<SnapshotStore> {
    let mut store = SnapshotStore::new(config.storage_root());
    store.initialize()?;

    if config.manage_gitignore {
        match ensure_gitignore(&config.workspace, store.root()) {
            Ok(outcome) => debug!("gitignore setup: {outcome:?}"),
            Err(e) => warn!("failed to update .gitignore: {e}"),
        }
    }

    Ok(store)
}

/// Add the storage directory to `<workspace>/.gitignore`, once.
pub fn ensure_gitignore(workspace: &Path, storage_root: &Path) -> io::Result<GitignoreSetup> {
    if !platform::is_git_repo(workspace) {
        return Ok(GitignoreSetup::NotARepository);
    }

    let Some(entry) = ignore_entry(workspace, storage_root) else {
        return Ok(GitignoreSetup::OutsideWorkspace);
    };

    let marker = storage_root.join(GITIGNORE_MARKER);
    if marker.exists() {
        return Ok(GitignoreSetup::AlreadyHandled);
    }

    let gitignore = workspace.join(".gitignore");
    let outcome = match fs::read_to_string(&gitignore) {
        Ok(existing) => {
            if existing.lines().any(|line| line.trim() == entry) {
                GitignoreSetup::AlreadyListed
            } else {
                let mut updated = existing;
                if !updated.is_empty() && !updated.ends_with('\n') {
                    updated.push('\n');
                }
                updated.push_str(&format!("{GITIGNORE_COMMENT}\n{entry}\n"));
                fs::write(&gitignore, updated)?;
                info!("added {entry} to .gitignore");
                GitignoreSetup::Appended
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::write(&gitignore, format!("{GITIGNORE_COMMENT}\n{entry}\n"))?;
            info!("created .gitignore with {entry}");
            GitignoreSetup::Created
        }
        Err(e) => return Err(e),
    };

    fs::write(
        &marker,
        "gitignore setup has been handled for this workspace.\n\
         Removing the entry from .gitignore is respected; snapkeep will not add it again.\n",
    )?;

    Ok(outcome)
}

/// `.gitignore` line for the storage root, e.g. `.snapkeep/`.
fn ignore_entry(workspace: &Path, storage_root: &Path) -> Option<String> {
    let relative: PathBuf = storage_root.strip_prefix(workspace).ok()?.to_path_buf();
    if relative.as_os_str().is_empty() {
        return None;
    }
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(format!("{}/", parts.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_workspace() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let root = dir.path().join(".snapkeep");
        fs::create_dir_all(&root).unwrap();
        (dir, root)
    }

    #[test]
    fn skips_non_git_workspace() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(".snapkeep");
        let outcome = ensure_gitignore(dir.path(), &root).unwrap();
        assert_eq!(outcome, GitignoreSetup::NotARepository);
        assert!(!dir.path().join(".gitignore").exists());
    }

    #[test]
    fn creates_gitignore_and_marker() {
        let (dir, root) = git_workspace();
        let outcome = ensure_gitignore(dir.path(), &root).unwrap();
        assert_eq!(outcome, GitignoreSetup::Created);

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "# snapkeep snapshots\n.snapkeep/\n");
        assert!(root.join(GITIGNORE_MARKER).exists());
    }

    #[test]
    fn appends_with_separating_newline() {
        let (dir, root) = git_workspace();
        fs::write(dir.path().join(".gitignore"), "target").unwrap();

        let outcome = ensure_gitignore(dir.path(), &root).unwrap();
        assert_eq!(outcome, GitignoreSetup::Appended);

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target\n# snapkeep snapshots\n.snapkeep/\n");
    }

    #[test]
    fn existing_entry_is_left_alone() {
        let (dir, root) = git_workspace();
        fs::write(dir.path().join(".gitignore"), "target/\n.snapkeep/\n").unwrap();

        let outcome = ensure_gitignore(dir.path(), &root).unwrap();
        assert_eq!(outcome, GitignoreSetup::AlreadyListed);
        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target/\n.snapkeep/\n");
    }

    #[test]
    fn marker_respects_later_removal() {
        let (dir, root) = git_workspace();
        ensure_gitignore(dir.path(), &root).unwrap();
        fs::write(dir.path().join(".gitignore"), "").unwrap();

        let outcome = ensure_gitignore(dir.path(), &root).unwrap();
        assert_eq!(outcome, GitignoreSetup::AlreadyHandled);
        assert_eq!(fs::read_to_string(dir.path().join(".gitignore")).unwrap(), "");
    }

    #[test]
    fn nested_storage_dir_uses_forward_slashes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(".cache").join("snapshots");
        assert_eq!(
            ignore_entry(dir.path(), &root).as_deref(),
            Some(".cache/snapshots/")
        );
    }

    #[test]
    fn storage_outside_workspace_is_skipped() {
        let (dir, _) = git_workspace();
        let elsewhere = TempDir::new().unwrap();
        let outcome = ensure_gitignore(dir.path(), elsewhere.path()).unwrap();
        assert_eq!(outcome, GitignoreSetup::OutsideWorkspace);
    }

    #[test]
    fn open_store_initializes_and_ignores() {
        let (dir, _) = git_workspace();
        let config = Config::for_workspace(dir.path().to_path_buf());

        let mut store = open_store(&config).unwrap();
        assert!(store.is_initialized());
        assert!(dir.path().join(".gitignore").exists());
        store.teardown();
    }
}
