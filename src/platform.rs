use std::io;
use std::path::{Path, PathBuf};

/// User config file (~/.config/snapkeep/config.toml or platform equivalent)
pub fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "snapkeep")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// True when `workspace` is the top of a git checkout.
pub fn is_git_repo(workspace: &Path) -> bool {
    workspace.join(".git").exists()
}

/// Absolute form of a user-supplied file path.
///
/// Existing files are canonicalized so repeated captures of the same file
/// record the same path. Paths that no longer exist (a deleted original) are
/// only joined onto the current directory.
pub fn absolute_file_path(path: &Path) -> io::Result<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
        Err(_) => Ok(std::env::current_dir()?.join(path)),
    }
}
