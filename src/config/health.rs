// ABOUTME: Health probe configuration.
// ABOUTME: Target URLs, per-request timeout, content markers, and fan-out width.

use serde::Deserialize;
use std::time::Duration;

use super::EnvValue;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_urls")]
    pub urls: Vec<EnvValue>,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_content_markers")]
    pub content_markers: Vec<String>,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl HealthConfig {
    /// URLs that resolved to a configured value, in declaration order.
    pub fn target_urls(&self) -> Vec<String> {
        self.urls.iter().filter_map(EnvValue::configured).collect()
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            timeout: default_timeout(),
            content_markers: default_content_markers(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_urls() -> Vec<EnvValue> {
    vec![EnvValue::from_env("SITE_URL"), EnvValue::from_env("S3_URL")]
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_content_markers() -> Vec<String> {
    vec!["<title>".to_string()]
}

fn default_concurrency() -> usize {
    4
}
