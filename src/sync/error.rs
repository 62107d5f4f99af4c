// ABOUTME: Error types for scanning and uploading the build directory.
// ABOUTME: Separates local configuration problems from transfer failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorClass;
use crate::types::{RemoteKey, RemoteKeyError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read build directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid object key for {path}: {source}")]
    InvalidKey {
        path: PathBuf,
        #[source]
        source: RemoteKeyError,
    },

    #[error("{} and {} both map to object key '{key}'", first.display(), second.display())]
    DuplicateKey {
        key: RemoteKey,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("upload of '{key}' failed: {message}")]
    Transfer { key: RemoteKey, message: String },
}

impl SyncError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SyncError::Walk(_) | SyncError::InvalidKey { .. } | SyncError::DuplicateKey { .. } => {
                ErrorClass::Configuration
            }
            SyncError::Transfer { .. } => ErrorClass::Transfer,
        }
    }
}

/// Failure reported by an object store for a single request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Request(String),
}
