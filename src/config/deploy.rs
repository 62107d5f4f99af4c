// ABOUTME: Validated, immutable configuration for one deploy run.
// ABOUTME: Merges file/env values with infrastructure outputs and fails fast on gaps.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{BucketName, DistributionId, EmptyIdError};

use super::{BUCKET_ENV, Config, DISTRIBUTION_ENV, EnvValue};

/// Values handed from the infrastructure controller to the release pipeline.
///
/// These take precedence over file and environment configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseOverrides {
    pub bucket: Option<String>,
    pub distribution_id: Option<String>,
}

/// Per-invocation switches from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    pub dry_run: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct DeployConfig {
    region: String,
    bucket: BucketName,
    distribution_id: DistributionId,
    build_dir: PathBuf,
    upload_concurrency: usize,
    dry_run: bool,
    verbose: bool,
}

/// The variable an operator should set. A blank literal in the file still
/// points at the conventional variable.
fn missing_name(value: &EnvValue, fallback: &str) -> String {
    match value {
        EnvValue::FromEnv { var, .. } => var.clone(),
        EnvValue::Literal(_) => fallback.to_string(),
    }
}

impl DeployConfig {
    /// Resolve and validate everything a deploy needs.
    ///
    /// Every missing value is reported at once, named by the environment
    /// variable that would supply it. No network or process I/O happens here.
    pub fn resolve(
        config: &Config,
        project_dir: &Path,
        overrides: Option<&ReleaseOverrides>,
        flags: RunFlags,
    ) -> Result<Self> {
        let overrides = overrides.cloned().unwrap_or_default();
        let mut missing = Vec::new();

        let region = config
            .region
            .configured()
            .unwrap_or_else(|| super::DEFAULT_REGION.to_string());

        let bucket = overrides
            .bucket
            .filter(|b| !super::is_placeholder(b) && !b.trim().is_empty())
            .or_else(|| config.bucket.configured());
        let distribution_id = overrides
            .distribution_id
            .filter(|d| !d.trim().is_empty())
            .or_else(|| config.distribution_id.configured());

        if bucket.is_none() {
            missing.push(missing_name(&config.bucket, BUCKET_ENV));
        }
        if distribution_id.is_none() {
            missing.push(missing_name(&config.distribution_id, DISTRIBUTION_ENV));
        }

        let (Some(bucket), Some(distribution_id)) = (bucket, distribution_id) else {
            return Err(Error::MissingConfiguration(missing));
        };

        let bucket = BucketName::new(&bucket)
            .map_err(|e| Error::InvalidConfig(format!("bucket '{bucket}': {e}")))?;
        let distribution_id: DistributionId = distribution_id
            .parse()
            .map_err(|e: EmptyIdError| Error::InvalidConfig(e.to_string()))?;

        let build_dir = if config.build_dir.is_absolute() {
            config.build_dir.clone()
        } else {
            project_dir.join(&config.build_dir)
        };
        if !build_dir.is_dir() {
            return Err(Error::BuildDirMissing(build_dir));
        }

        Ok(Self {
            region,
            bucket,
            distribution_id,
            build_dir,
            upload_concurrency: config.upload_concurrency.max(1),
            dry_run: flags.dry_run,
            verbose: flags.verbose,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    pub fn distribution_id(&self) -> &DistributionId {
        &self.distribution_id
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn upload_concurrency(&self) -> usize {
        self.upload_concurrency
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
