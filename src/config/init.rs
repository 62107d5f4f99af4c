// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a skylift.yml template wired to the standard environment variables.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;
    Ok(())
}

const TEMPLATE: &str = r#"# Region for the bucket and CDN clients.
region:
  env: AWS_REGION
  default: us-east-1

# Filled in by `skylift infra output --export` or `skylift deploy --from-infra`.
bucket:
  env: S3_BUCKET
distribution_id:
  env: CLOUDFRONT_DISTRIBUTION_ID

# Output of the static site build.
build_dir: site/dist
upload_concurrency: 4

infra:
  dir: infra
  engine: tofu
  plan_file: tfplan
  required_files:
    - main.tf
    - variables.tf
    - terraform.tfvars

health:
  urls:
    - env: SITE_URL
    - env: S3_URL
  timeout: 10s
  content_markers:
    - "<title>"
  concurrency: 4
"#;
