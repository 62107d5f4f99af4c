// ABOUTME: Environment variable value types with interpolation support.
// ABOUTME: Handles literals, env references, and unresolved template placeholders.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn from_env(var: &str) -> Self {
        EnvValue::FromEnv {
            var: var.to_string(),
            default: None,
        }
    }

    pub fn from_env_or(var: &str, default: &str) -> Self {
        EnvValue::FromEnv {
            var: var.to_string(),
            default: Some(default.to_string()),
        }
    }

    /// Resolve to a usable value, or `None` when nothing is configured.
    ///
    /// Empty strings and values still carrying a `{{...}}` template
    /// placeholder count as not configured.
    pub fn configured(&self) -> Option<String> {
        let raw = match self {
            EnvValue::Literal(s) => Some(s.clone()),
            EnvValue::FromEnv { var, default } => std::env::var(var)
                .ok()
                .filter(|v| is_configured(v))
                .or_else(|| default.clone()),
        };
        raw.map(|v| v.trim().to_string()).filter(|v| is_configured(v))
    }
}

fn is_configured(value: &str) -> bool {
    !value.trim().is_empty() && !is_placeholder(value)
}

/// Whether a value still contains an unsubstituted `{{NAME}}` marker.
pub fn is_placeholder(value: &str) -> bool {
    value
        .find("{{")
        .is_some_and(|start| value[start..].contains("}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder("{{PROJECT_NAME}}-site-bucket"));
        assert!(is_placeholder("https://{{DOMAIN_NAME}}"));
        assert!(!is_placeholder("my-site-bucket"));
        assert!(!is_placeholder("}}backwards{{"));
    }

    #[test]
    fn literal_placeholder_is_not_configured() {
        let value = EnvValue::Literal("{{PROJECT_NAME}}-site-bucket".to_string());
        assert_eq!(value.configured(), None);
    }

    #[test]
    fn env_default_placeholder_is_not_configured() {
        temp_env::with_var_unset("SKYLIFT_TEST_BUCKET", || {
            let value =
                EnvValue::from_env_or("SKYLIFT_TEST_BUCKET", "{{PROJECT_NAME}}-site-bucket");
            assert_eq!(value.configured(), None);
        });
    }

    #[test]
    fn env_overrides_default() {
        temp_env::with_var("SKYLIFT_TEST_REGION", Some("eu-west-1"), || {
            let value = EnvValue::from_env_or("SKYLIFT_TEST_REGION", "us-east-1");
            assert_eq!(value.configured().as_deref(), Some("eu-west-1"));
        });
    }

    #[test]
    fn empty_env_falls_back_to_default() {
        temp_env::with_var("SKYLIFT_TEST_REGION_EMPTY", Some(""), || {
            let value = EnvValue::from_env_or("SKYLIFT_TEST_REGION_EMPTY", "us-east-1");
            assert_eq!(value.configured().as_deref(), Some("us-east-1"));
        });
    }
}
