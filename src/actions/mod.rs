//! Operations built on top of the snapshot store.
//!
//! Each action reads from the store and touches the working copy:
//! - restore: put snapshot content back, with an automatic backup first
//! - export: write snapshot content to a new file
//! - compare: diff snapshot content against the current file

pub mod compare;
pub mod export;
pub mod restore;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

pub use compare::{diff_with_current, Comparison};
pub use export::{export, suggested_export_name};
pub use restore::{restore, RestoreOptions, RestoreOutcome};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("backup snapshot of {} failed: {source}", path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("original file {} no longer exists", path.display())]
    OriginalMissing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
