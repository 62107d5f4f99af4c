// ABOUTME: Invalidation request/record types and the invalidate operation.
// ABOUTME: Skips with a warning when no distribution is known; simulates in dry runs.

use chrono::{DateTime, Utc};
use nonempty::NonEmpty;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{DistributionId, InvalidationId};

use super::client::CdnClient;

#[derive(Debug, Error)]
pub enum CdnError {
    #[error("invalidation request failed: {0}")]
    Request(String),

    #[error("invalidation response carried no identifier")]
    MissingId,
}

/// Paths to purge. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationRequest {
    pub paths: NonEmpty<String>,
}

impl InvalidationRequest {
    /// Purge everything.
    pub fn full_site() -> Self {
        Self {
            paths: NonEmpty::new("/*".to_string()),
        }
    }
}

impl Default for InvalidationRequest {
    fn default() -> Self {
        Self::full_site()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidationRecord {
    pub id: InvalidationId,
    pub distribution: DistributionId,
    pub paths: Vec<String>,
    pub caller_reference: String,
    pub created_at: DateTime<Utc>,
    /// Dry-run record; nothing was sent.
    pub simulated: bool,
}

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// `deploy-<unix millis>` idempotency token.
///
/// A call landing in the same millisecond as the previous one takes the
/// next millisecond, so tokens never repeat within a process.
pub fn caller_reference() -> String {
    let now = Utc::now().timestamp_millis();
    let next = |last: i64| now.max(last + 1);
    let millis = match LAST_MILLIS.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
        Some(next(last))
    }) {
        Ok(last) | Err(last) => next(last),
    };
    format!("deploy-{millis}")
}

/// Request invalidation of `request.paths` on `distribution`.
///
/// With no distribution this records a warning and returns `Ok(None)`. In
/// a dry run a simulated record is returned and the client is not called.
pub async fn invalidate<C: CdnClient + ?Sized>(
    client: &C,
    distribution: Option<&DistributionId>,
    request: &InvalidationRequest,
    dry_run: bool,
    diag: &mut Diagnostics,
) -> Result<Option<InvalidationRecord>, CdnError> {
    let Some(distribution) = distribution else {
        diag.warn(Warning::cdn_not_configured());
        return Ok(None);
    };

    let caller_reference = caller_reference();
    let paths: Vec<String> = request.paths.iter().cloned().collect();

    let id = if dry_run {
        tracing::debug!(distribution = %distribution, "dry run, skipping invalidation");
        InvalidationId::new(format!("dry-run-{caller_reference}"))
    } else {
        let id = client
            .create_invalidation(distribution, &caller_reference, &request.paths)
            .await?;
        tracing::info!(distribution = %distribution, invalidation = %id, "invalidation created");
        id
    };

    Ok(Some(InvalidationRecord {
        id,
        distribution: distribution.clone(),
        paths,
        caller_reference,
        created_at: Utc::now(),
        simulated: dry_run,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_site_purges_everything() {
        let request = InvalidationRequest::default();
        assert_eq!(request.paths.len(), 1);
        assert_eq!(request.paths.head, "/*");
    }

    #[test]
    fn caller_references_are_unique() {
        let a = caller_reference();
        let b = caller_reference();
        assert_ne!(a, b);

        let millis = |r: &str| r.strip_prefix("deploy-").unwrap().parse::<i64>().unwrap();
        assert!(millis(&b) > millis(&a));
        assert!(millis(&a) >= Utc::now().timestamp_millis() - 60_000);
    }
}
