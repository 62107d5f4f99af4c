// ABOUTME: Health command implementation.
// ABOUTME: Probes configured URLs and fails when any of them is unhealthy.

use skylift::diagnostics::Diagnostics;
use skylift::error::{Error, Result};
use skylift::release;

use super::Context;

pub async fn health(ctx: &Context) -> Result<()> {
    let output = ctx.output();
    let mut diag = Diagnostics::default();

    let summary = release::verify(&ctx.config.health, &mut diag).await?;
    output.report("health", &summary);

    for result in &summary.results {
        let mark = if result.success { "✓" } else { "✗" };
        let detail = match (&result.status, &result.error) {
            (Some(status), None) => format!("HTTP {status}"),
            (_, Some(error)) => error.clone(),
            (None, None) => String::new(),
        };
        output.progress(&format!(
            "  {mark} {} {detail} ({}ms)",
            result.url, result.response_time_ms
        ));
    }

    output.diagnostics(&diag);

    if !summary.all_healthy() {
        return Err(Error::Unhealthy {
            failed: summary.failed(),
            total: summary.total,
        });
    }

    match summary.average_response_ms {
        Some(avg) => output.success(&format!(
            "{}/{} healthy (average {avg}ms)",
            summary.succeeded, summary.total
        )),
        None => output.success("Nothing to check"),
    }
    Ok(())
}
