// ABOUTME: Parsed infrastructure outputs (`output -json`).
// ABOUTME: Maps the well-known bucket and distribution outputs onto release overrides.

use serde::Deserialize;
use snafu::ResultExt;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{BUCKET_ENV, DISTRIBUTION_ENV, ReleaseOverrides};

use super::error::{InfraError, OutputsParseSnafu};

/// Output naming the site bucket.
pub const BUCKET_OUTPUT: &str = "s3_bucket_name";
/// Output naming the CDN distribution.
pub const DISTRIBUTION_OUTPUT: &str = "cloudfront_distribution_id";

#[derive(Debug, Deserialize)]
struct RawOutput {
    value: serde_json::Value,
    #[serde(default)]
    sensitive: bool,
}

/// Name to value mapping. Non-string values are kept as compact JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfraOutputs {
    values: BTreeMap<String, String>,
    sensitive: BTreeSet<String>,
}

impl InfraOutputs {
    /// Parse the engine's JSON output document.
    ///
    /// Either every entry parses or none are returned. An empty document
    /// (no outputs declared) yields an empty set.
    pub fn parse(stdout: &str) -> Result<Self, InfraError> {
        if stdout.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: BTreeMap<String, RawOutput> =
            serde_json::from_str(stdout).context(OutputsParseSnafu)?;

        let mut outputs = Self::default();
        for (name, entry) in raw {
            let value = match entry.value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            if entry.sensitive {
                outputs.sensitive.insert(name.clone());
            }
            outputs.values.insert(name, value);
        }
        Ok(outputs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive.contains(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values to feed into the release configuration.
    pub fn release_overrides(&self) -> ReleaseOverrides {
        let present = |name: &str| {
            self.get(name)
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };
        ReleaseOverrides {
            bucket: present(BUCKET_OUTPUT),
            distribution_id: present(DISTRIBUTION_OUTPUT),
        }
    }

    /// `KEY='VALUE'` lines for the well-known outputs, suitable for `eval`
    /// or an env file. Values are single-quoted for a POSIX shell.
    pub fn export_lines(&self) -> Vec<String> {
        let overrides = self.release_overrides();
        [
            (BUCKET_ENV, overrides.bucket),
            (DISTRIBUTION_ENV, overrides.distribution_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{key}={}", shell_quote(&v))))
        .collect()
    }
}

/// Wrap in single quotes; an embedded quote becomes `'\''`.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "s3_bucket_name": {"sensitive": false, "type": "string", "value": "demo-site-bucket"},
        "cloudfront_distribution_id": {"sensitive": false, "type": "string", "value": "E2ABC123"},
        "website_url": {"sensitive": false, "type": "string", "value": "https://example.com"},
        "ports": {"sensitive": false, "type": ["list", "number"], "value": [80, 443]},
        "api_key": {"sensitive": true, "type": "string", "value": "s3cret"}
    }"#;

    #[test]
    fn parses_string_and_structured_values() {
        let outputs = InfraOutputs::parse(SAMPLE).unwrap();
        assert_eq!(outputs.len(), 5);
        assert_eq!(outputs.get("website_url"), Some("https://example.com"));
        assert_eq!(outputs.get("ports"), Some("[80,443]"));
        assert!(outputs.is_sensitive("api_key"));
        assert!(!outputs.is_sensitive("website_url"));
    }

    #[test]
    fn maps_well_known_outputs_to_overrides() {
        let outputs = InfraOutputs::parse(SAMPLE).unwrap();
        assert_eq!(
            outputs.release_overrides(),
            ReleaseOverrides {
                bucket: Some("demo-site-bucket".to_string()),
                distribution_id: Some("E2ABC123".to_string()),
            }
        );
        assert_eq!(
            outputs.export_lines(),
            vec![
                "S3_BUCKET='demo-site-bucket'".to_string(),
                "CLOUDFRONT_DISTRIBUTION_ID='E2ABC123'".to_string(),
            ]
        );
    }

    #[test]
    fn export_values_survive_the_shell() {
        let outputs = InfraOutputs::parse(
            r#"{"s3_bucket_name": {"sensitive": false, "type": "string", "value": "a b;$(rm -rf ~)'x"}}"#,
        )
        .unwrap();
        assert_eq!(
            outputs.export_lines(),
            vec![r"S3_BUCKET='a b;$(rm -rf ~)'\''x'".to_string()]
        );
    }

    #[test]
    fn empty_document_is_empty_set() {
        assert!(InfraOutputs::parse("").unwrap().is_empty());
        assert!(InfraOutputs::parse("{}").unwrap().is_empty());
        assert_eq!(
            InfraOutputs::parse("{}").unwrap().release_overrides(),
            ReleaseOverrides::default()
        );
    }

    #[test]
    fn malformed_entry_fails_whole_parse() {
        let doc = r#"{"ok": {"value": "x"}, "broken": {"type": "string"}}"#;
        let err = InfraOutputs::parse(doc).unwrap_err();
        assert!(matches!(err, InfraError::OutputsParse { .. }));
    }

    #[test]
    fn non_json_fails() {
        assert!(InfraOutputs::parse("Warning: no outputs").is_err());
    }
}
