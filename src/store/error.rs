//! Snapshot store error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// The store operation that was running when a fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Get,
    List,
    ReadContent,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Get => "get",
            Operation::List => "list",
            Operation::ReadContent => "read content",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification callers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Storage root or index unusable; the caller must not proceed.
    Initialization,
    /// No record with the requested id.
    NotFound,
    /// Filesystem or index failure during an operation.
    Storage,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to initialize snapshot storage at {}: {reason}", path.display())]
    Initialization { path: PathBuf, reason: String },

    #[error("snapshot not found: {0}")]
    NotFound(String),

    #[error("{op} failed for {}: {source}", path.display())]
    Storage {
        op: Operation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot index {op} failed: {source}")]
    Index {
        op: Operation,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Initialization { .. } => ErrorKind::Initialization,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Storage { .. } | StoreError::Index { .. } => ErrorKind::Storage,
        }
    }

    pub(crate) fn init(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        StoreError::Initialization {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(op: Operation, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Storage {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn index(op: Operation) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| StoreError::Index { op, source }
    }
}
