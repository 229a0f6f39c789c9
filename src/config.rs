use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::GlobalArgs;
use crate::platform;

pub const WORKSPACE_CONFIG_FILE: &str = ".snapkeep.toml";
pub const DEFAULT_STORAGE_DIR: &str = ".snapkeep";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine workspace directory: {0}")]
    Workspace(#[source] io::Error),

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk config; every key optional so files can be layered.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub storage_dir: Option<PathBuf>,
    pub manage_gitignore: Option<bool>,
    pub backup_before_restore: Option<bool>,
    pub diff_context: Option<usize>,
}

impl FileConfig {
    /// Read a config file; a missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&text)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub workspace: PathBuf,
    /// Storage directory, relative to the workspace unless absolute.
    pub storage_dir: PathBuf,
    pub manage_gitignore: bool,
    pub backup_before_restore: bool,
    pub diff_context: usize,
}

impl Config {
    pub fn for_workspace(workspace: PathBuf) -> Self {
        Config {
            workspace,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            manage_gitignore: true,
            backup_before_restore: true,
            diff_context: 3,
        }
    }

    /// Defaults, then the user config file, then `<workspace>/.snapkeep.toml`,
    /// then command-line flags.
    pub fn from_args(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let workspace = match &args.workspace {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(ConfigError::Workspace)?,
        };

        let mut config = Config::for_workspace(workspace);

        if let Some(user_file) = platform::user_config_file() {
            if let Some(file) = FileConfig::load(&user_file)? {
                config.apply(file);
            }
        }

        let workspace_file = config.workspace.join(WORKSPACE_CONFIG_FILE);
        if let Some(file) = FileConfig::load(&workspace_file)? {
            config.apply(file);
        }

        if let Some(dir) = &args.storage_dir {
            config.storage_dir = dir.clone();
        }

        Ok(config)
    }

    pub fn apply(&mut self, file: FileConfig) {
        if let Some(dir) = file.storage_dir {
            self.storage_dir = dir;
        }
        if let Some(manage) = file.manage_gitignore {
            self.manage_gitignore = manage;
        }
        if let Some(backup) = file.backup_before_restore {
            self.backup_before_restore = backup;
        }
        if let Some(context) = file.diff_context {
            self.diff_context = context;
        }
    }

    /// Root directory handed to the snapshot store.
    pub fn storage_root(&self) -> PathBuf {
        self.workspace.join(&self.storage_dir)
    }
}
