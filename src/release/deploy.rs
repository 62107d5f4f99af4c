// ABOUTME: Deploy flow: sync the build directory, then invalidate the CDN.
// ABOUTME: Invalidation only runs after every upload succeeded.

use serde::Serialize;

use crate::cdn::{CdnClient, InvalidationRecord, InvalidationRequest, invalidate};
use crate::config::DeployConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::sync::{ObjectStore, RunSummary, SyncPipeline};

#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub sync: RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidation: Option<InvalidationRecord>,
}

pub async fn deploy<S, C>(
    config: &DeployConfig,
    store: &S,
    cdn: &C,
    diag: &mut Diagnostics,
) -> Result<DeployReport>
where
    S: ObjectStore + ?Sized,
    C: CdnClient + ?Sized,
{
    tracing::info!(
        bucket = %config.bucket(),
        distribution = %config.distribution_id(),
        region = config.region(),
        "deploying {}",
        config.build_dir().display()
    );

    let sync = SyncPipeline::new(config, store).sync_all().await?;

    let invalidation = invalidate(
        cdn,
        Some(config.distribution_id()),
        &InvalidationRequest::full_site(),
        config.dry_run(),
        diag,
    )
    .await?;

    Ok(DeployReport { sync, invalidation })
}
