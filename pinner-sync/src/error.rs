//! Sync error types.

use pinner_github::GitHubError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync, install and persistence operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("filesystem error at {path}: {source}")]
    Fs {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid plugin entry: {0}")]
    InvalidEntry(String),

    #[error("secret storage error: {0}")]
    Secret(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

impl SyncError {
    pub(crate) fn fs(path: impl Into<String>, source: std::io::Error) -> Self {
        SyncError::Fs {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Fs { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
