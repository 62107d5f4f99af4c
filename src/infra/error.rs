// ABOUTME: Infrastructure controller error types with SNAFU pattern.
// ABOUTME: Every failure names the lifecycle stage it came from.

use chrono::{DateTime, Utc};
use snafu::Snafu;
use std::fmt;
use std::path::PathBuf;

use crate::error::ErrorClass;

/// Lifecycle stage, used for logging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfraStage {
    Validate,
    Init,
    Plan,
    Apply,
    Destroy,
    Output,
}

impl InfraStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfraStage::Validate => "validate",
            InfraStage::Init => "init",
            InfraStage::Plan => "plan",
            InfraStage::Apply => "apply",
            InfraStage::Destroy => "destroy",
            InfraStage::Output => "output",
        }
    }
}

impl fmt::Display for InfraStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InfraError {
    #[snafu(display("infrastructure directory not found: {}", path.display()))]
    DirectoryMissing { path: PathBuf },

    #[snafu(display("missing required infrastructure files: {}", missing.join(", ")))]
    MissingFiles { missing: Vec<String> },

    #[snafu(display("{stage}: failed to execute {program}: {source}"))]
    Spawn {
        stage: InfraStage,
        program: String,
        source: std::io::Error,
    },

    #[snafu(display(
        "{stage} failed with {}: {}",
        exit_label(code.as_ref().copied()),
        stderr.trim()
    ))]
    ToolFailed {
        stage: InfraStage,
        code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("failed to parse infrastructure outputs: {source}"))]
    OutputsParse { source: serde_json::Error },

    #[snafu(display("operation cancelled by user"))]
    Aborted {},

    #[snafu(display("confirmation prompt failed: {source}"))]
    Prompt { source: std::io::Error },

    #[snafu(display(
        "infrastructure directory is locked by {holder} (pid {pid}, {command}) since {started_at}"
    ))]
    LockHeld {
        holder: String,
        pid: u32,
        command: String,
        started_at: DateTime<Utc>,
    },

    #[snafu(display("lock file {}: {source}", path.display()))]
    LockIo {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl InfraError {
    pub fn class(&self) -> ErrorClass {
        match self {
            InfraError::DirectoryMissing { .. }
            | InfraError::MissingFiles { .. }
            | InfraError::Prompt { .. }
            | InfraError::LockHeld { .. } => ErrorClass::Configuration,
            InfraError::Spawn { .. }
            | InfraError::ToolFailed { .. }
            | InfraError::OutputsParse { .. }
            | InfraError::LockIo { .. } => ErrorClass::ToolExecution,
            InfraError::Aborted {} => ErrorClass::UserAbort,
        }
    }

    /// Stage that failed, when the failure came from an engine call.
    pub fn stage(&self) -> Option<InfraStage> {
        match self {
            InfraError::Spawn { stage, .. } | InfraError::ToolFailed { stage, .. } => Some(*stage),
            InfraError::DirectoryMissing { .. } | InfraError::MissingFiles { .. } => {
                Some(InfraStage::Validate)
            }
            InfraError::OutputsParse { .. } => Some(InfraStage::Output),
            _ => None,
        }
    }
}
