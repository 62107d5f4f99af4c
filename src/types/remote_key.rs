// ABOUTME: Object keys derived from paths relative to the build directory.
// ABOUTME: Normalizes separators to POSIX form so keys are stable across platforms.

use serde::Serialize;
use std::fmt;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteKeyError {
    #[error("object key cannot be empty")]
    Empty,

    #[error("path escapes the build directory: {0}")]
    Escapes(String),

    #[error("path is not valid UTF-8: {0}")]
    NotUtf8(String),
}

/// Identity of an uploaded object. Uploading the same key twice overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RemoteKey(String);

impl RemoteKey {
    /// Build a key from a path relative to the sync root.
    ///
    /// `.` components are dropped, `..` is rejected, and both `/` and `\`
    /// separators collapse to `/`.
    pub fn from_relative_path(path: &Path) -> Result<Self, RemoteKeyError> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| RemoteKeyError::NotUtf8(path.display().to_string()))?;
                    parts.extend(part.split('\\').filter(|p| !p.is_empty()));
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(RemoteKeyError::Escapes(path.display().to_string()));
                }
            }
        }

        Self::parse(&parts.join("/"))
    }

    pub fn parse(value: &str) -> Result<Self, RemoteKeyError> {
        let normalized = value.replace('\\', "/");
        let normalized = normalized.trim_start_matches('/');
        if normalized.is_empty() {
            return Err(RemoteKeyError::Empty);
        }
        if normalized.split('/').any(|segment| segment == "..") {
            return Err(RemoteKeyError::Escapes(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key names an HTML document.
    pub fn is_html(&self) -> bool {
        self.0 == "index.html" || self.0.ends_with(".html")
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
