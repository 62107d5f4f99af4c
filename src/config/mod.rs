// ABOUTME: Configuration types and parsing for skylift.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and environment-only defaults.

mod deploy;
mod deserialize;
mod env_value;
mod health;
mod infra;
mod init;

pub use deploy::{DeployConfig, ReleaseOverrides, RunFlags};
pub use env_value::{EnvValue, is_placeholder};
pub use health::HealthConfig;
pub use infra::InfraConfig;
pub use init::init_config;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "skylift.yml";
pub const CONFIG_FILENAME_ALT: &str = "skylift.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".skylift/config.yml";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const BUCKET_ENV: &str = "S3_BUCKET";
pub const DISTRIBUTION_ENV: &str = "CLOUDFRONT_DISTRIBUTION_ID";
pub const REGION_ENV: &str = "AWS_REGION";
const BUCKET_PLACEHOLDER: &str = "{{PROJECT_NAME}}-site-bucket";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_region")]
    pub region: EnvValue,

    #[serde(default = "default_bucket")]
    pub bucket: EnvValue,

    #[serde(default = "default_distribution_id")]
    pub distribution_id: EnvValue,

    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,

    #[serde(default)]
    pub infra: InfraConfig,

    #[serde(default)]
    pub health: HealthConfig,
}

fn default_region() -> EnvValue {
    EnvValue::from_env_or(REGION_ENV, DEFAULT_REGION)
}

fn default_bucket() -> EnvValue {
    EnvValue::from_env_or(BUCKET_ENV, BUCKET_PLACEHOLDER)
}

fn default_distribution_id() -> EnvValue {
    EnvValue::from_env(DISTRIBUTION_ENV)
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("site/dist")
}

fn default_upload_concurrency() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            bucket: default_bucket(),
            distribution_id: default_distribution_id(),
            build_dir: default_build_dir(),
            upload_concurrency: default_upload_concurrency(),
            infra: InfraConfig::default(),
            health: HealthConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`, or fall back to
    /// environment-driven defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                tracing::debug!("No configuration file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    fn find(dir: &Path) -> Option<PathBuf> {
        [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Infrastructure directory, resolved against the project directory.
    pub fn infra_dir(&self, project_dir: &Path) -> PathBuf {
        if self.infra.dir.is_absolute() {
            self.infra.dir.clone()
        } else {
            project_dir.join(&self.infra.dir)
        }
    }
}
