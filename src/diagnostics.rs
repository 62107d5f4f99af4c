// ABOUTME: Diagnostics accumulator for non-fatal warnings during a release.
// ABOUTME: Collects conditions that shouldn't fail a run but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during release operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning. The CLI prints collected warnings once the
    /// command finishes.
    pub fn warn(&mut self, warning: Warning) {
        tracing::debug!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// A non-fatal warning collected during a release.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn lock_release(message: impl Into<String>) -> Self {
        Self::new(WarningKind::LockRelease, message)
    }

    pub fn stale_lock_broken(holder: &str, pid: u32) -> Self {
        Self::new(
            WarningKind::StaleLockBroken,
            format!("Broke infrastructure lock previously held by {holder} (pid {pid})"),
        )
    }

    pub fn cdn_not_configured() -> Self {
        Self::new(
            WarningKind::CdnNotConfigured,
            "No CDN distribution configured, skipping cache invalidation",
        )
    }

    pub fn no_health_targets() -> Self {
        Self::new(
            WarningKind::NoHealthTargets,
            "No URLs configured for health checks",
        )
    }

    pub fn content_signature_missing(url: &str) -> Self {
        Self::new(
            WarningKind::ContentSignatureMissing,
            format!("{url} responded but no expected content marker was found"),
        )
    }
}

/// Categories of warnings that can occur during a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Failed to release the infrastructure lock (lock file may remain).
    LockRelease,
    /// An existing lock was stale or force-broken.
    StaleLockBroken,
    /// Invalidation skipped because no distribution is known.
    CdnNotConfigured,
    /// Health check ran with nothing to probe.
    NoHealthTargets,
    /// A healthy response lacked every configured content marker.
    ContentSignatureMissing,
}
