// ABOUTME: Application-wide error types for skylift.
// ABOUTME: Uses thiserror and classifies every failure under one exit-code contract.

use std::path::PathBuf;
use thiserror::Error;

use crate::cdn::CdnError;
use crate::infra::InfraError;
use crate::sync::SyncError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfiguration(Vec<String>),

    #[error("build directory not found: {0} (run the site build first)")]
    BuildDirMissing(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{failed}/{total} health check(s) failed")]
    Unhealthy { failed: usize, total: usize },

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Cdn(#[from] CdnError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure classes shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing or invalid input, detected before any I/O. Never retried.
    Configuration,
    /// The IaC engine exited non-zero outside the plan-stage overload.
    ToolExecution,
    /// An upload or CDN request failed. The whole run is safe to repeat.
    Transfer,
    /// A probe could not reach its target.
    Network,
    /// The operator declined a destructive action.
    UserAbort,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::AlreadyExists(_)
            | Error::MissingConfiguration(_)
            | Error::BuildDirMissing(_)
            | Error::InvalidConfig(_)
            | Error::Yaml(_) => ErrorClass::Configuration,
            Error::Unhealthy { .. } => ErrorClass::Network,
            Error::Infra(e) => e.class(),
            Error::Sync(e) => e.class(),
            Error::Cdn(_) => ErrorClass::Transfer,
            Error::Io(_) => ErrorClass::Transfer,
        }
    }

    /// Process exit code. A user abort is a clean exit.
    pub fn exit_code(&self) -> i32 {
        match self.class() {
            ErrorClass::UserAbort => 0,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
