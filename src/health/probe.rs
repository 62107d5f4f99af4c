// ABOUTME: Reqwest-based probe for one or many URLs.
// ABOUTME: Redirects are not followed; the first response decides the verdict.

use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};

use crate::config::HealthConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};

use super::summary::{HealthResult, HealthSummary};

pub const USER_AGENT: &str = concat!("skylift-health-check/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Probe {
    client: reqwest::Client,
    markers: Vec<String>,
}

impl Probe {
    pub fn new(markers: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, markers })
    }

    pub fn from_config(config: &HealthConfig) -> Result<Self> {
        Self::new(config.content_markers.clone())
    }

    /// Probe one URL. Every failure is captured in the result.
    pub async fn check_one(&self, url: &str, timeout: Duration) -> HealthResult {
        let started = Instant::now();

        let response =
            match tokio::time::timeout(timeout, self.client.get(url).send()).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    return HealthResult::failed(url, elapsed_ms(started), error_chain(&e));
                }
                Err(_) => {
                    return HealthResult::failed(
                        url,
                        millis(timeout),
                        format!("timed out after {}ms", millis(timeout)),
                    );
                }
            };

        let response_time_ms = elapsed_ms(started);
        let status = response.status();

        // Body is only read for the content marker; a slow or broken body
        // does not change the verdict.
        let remaining = timeout.saturating_sub(started.elapsed());
        let content_signature_matched = match tokio::time::timeout(remaining, response.text()).await {
            Ok(Ok(body)) => self.markers.iter().any(|m| body.contains(m.as_str())),
            _ => false,
        };

        let success = status.is_success() || status.is_redirection();
        tracing::debug!(url, status = status.as_u16(), response_time_ms, "probed");

        HealthResult {
            url: url.to_string(),
            success,
            status: Some(status.as_u16()),
            response_time_ms,
            content_signature_matched,
            error: (!success).then(|| format!("unexpected status {status}")),
        }
    }

    /// Probe every URL, at most `concurrency` at once. Results keep input
    /// order.
    pub async fn check_all(
        &self,
        urls: &[String],
        timeout: Duration,
        concurrency: usize,
        diag: &mut Diagnostics,
    ) -> HealthSummary {
        if urls.is_empty() {
            diag.warn(Warning::no_health_targets());
            return HealthSummary::default();
        }

        let results: Vec<HealthResult> = stream::iter(urls)
            .map(|url| self.check_one(url, timeout))
            .buffered(concurrency.max(1))
            .collect()
            .await;

        for result in &results {
            if result.success && !result.content_signature_matched && !self.markers.is_empty() {
                diag.warn(Warning::content_signature_missing(&result.url));
            }
        }

        HealthSummary::from_results(results)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn elapsed_ms(started: Instant) -> u64 {
    millis(started.elapsed())
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
