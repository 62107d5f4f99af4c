// ABOUTME: Per-URL probe results and their aggregate.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResult {
    pub url: String,
    /// A 2xx or 3xx status arrived within the timeout.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Time to response headers. Equals the timeout when it elapsed.
    pub response_time_ms: u64,
    /// The body contained at least one configured content marker.
    pub content_signature_matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResult {
    pub fn failed(url: &str, response_time_ms: u64, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            status: None,
            response_time_ms,
            content_signature_matched: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub results: Vec<HealthResult>,
    pub succeeded: usize,
    pub total: usize,
    /// Mean response time across every probe, timeouts included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_response_ms: Option<u64>,
}

impl HealthSummary {
    pub fn from_results(results: Vec<HealthResult>) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.success).count();
        let average_response_ms = if total == 0 {
            None
        } else {
            let sum: u64 = results.iter().map(|r| r.response_time_ms).sum();
            Some((sum as f64 / total as f64).round() as u64)
        };

        Self {
            results,
            succeeded,
            total,
            average_response_ms,
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// True when nothing failed, including when nothing was probed.
    pub fn all_healthy(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn failed_urls(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.url.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(url: &str, ms: u64) -> HealthResult {
        HealthResult {
            url: url.to_string(),
            success: true,
            status: Some(200),
            response_time_ms: ms,
            content_signature_matched: true,
            error: None,
        }
    }

    #[test]
    fn summarizes_mixed_results() {
        let summary = HealthSummary::from_results(vec![
            ok("https://a.example", 100),
            HealthResult::failed("https://b.example", 201, "connection refused"),
        ]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.average_response_ms, Some(151));
        assert!(!summary.all_healthy());
        assert_eq!(summary.failed_urls(), vec!["https://b.example"]);
    }

    #[test]
    fn empty_summary_is_healthy() {
        let summary = HealthSummary::from_results(vec![]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_response_ms, None);
        assert!(summary.all_healthy());
    }
}
