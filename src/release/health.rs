// ABOUTME: Health flow: probe every configured URL.

use crate::config::HealthConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::health::{HealthSummary, Probe};

/// Probe the configured targets. Unhealthy results are data, not errors.
pub async fn verify(config: &HealthConfig, diag: &mut Diagnostics) -> Result<HealthSummary> {
    let probe = Probe::from_config(config)?;
    let urls = config.target_urls();
    Ok(probe
        .check_all(&urls, config.timeout, config.concurrency, diag)
        .await)
}
