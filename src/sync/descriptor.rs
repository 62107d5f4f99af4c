// ABOUTME: Per-file upload metadata: object key, content type, and cache policy.
// ABOUTME: Also holds the per-file outcome and run summary the pipeline reports.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::RemoteKey;

/// Fallback when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Cache lifetime class for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// HTML documents: revalidated often so new releases show up quickly.
    Short,
    /// Everything else: long-lived.
    Long,
}

impl CachePolicy {
    /// Documents get the short policy; all other assets the long one.
    pub fn for_key(key: &RemoteKey) -> Self {
        if key.is_html() {
            CachePolicy::Short
        } else {
            CachePolicy::Long
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            CachePolicy::Short => "public, max-age=300",
            CachePolicy::Long => "public, max-age=31536000",
        }
    }
}

/// Content type by extension.
pub fn content_type_for(key: &RemoteKey) -> String {
    mime_guess::from_path(key.as_str())
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// One file to upload, with everything derived from its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    pub local_path: PathBuf,
    pub remote_key: RemoteKey,
    pub content_type: String,
    pub cache_policy: CachePolicy,
}

impl FileDescriptor {
    pub fn new(local_path: PathBuf, remote_key: RemoteKey) -> Self {
        Self {
            content_type: content_type_for(&remote_key),
            cache_policy: CachePolicy::for_key(&remote_key),
            local_path,
            remote_key,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub descriptor: FileDescriptor,
    pub success: bool,
    /// Dry-run outcome; nothing was sent.
    pub simulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadOutcome {
    pub fn uploaded(descriptor: FileDescriptor) -> Self {
        Self {
            descriptor,
            success: true,
            simulated: false,
            error: None,
        }
    }

    pub fn simulated(descriptor: FileDescriptor) -> Self {
        Self {
            descriptor,
            success: true,
            simulated: true,
            error: None,
        }
    }

    pub fn failed(descriptor: FileDescriptor, error: impl Into<String>) -> Self {
        Self {
            descriptor,
            success: false,
            simulated: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate of one sync run, ordered by object key.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<UploadOutcome>,
    pub dry_run: bool,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn uploaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }
}
