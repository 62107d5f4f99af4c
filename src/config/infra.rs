// ABOUTME: Infrastructure directory and IaC engine configuration.
// ABOUTME: Names the engine binary, plan artifact, and required declaration files.

use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::PathBuf;

use super::deserialize::deserialize_nonempty_strings;

#[derive(Debug, Clone, Deserialize)]
pub struct InfraConfig {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_plan_file")]
    pub plan_file: String,

    #[serde(
        default = "default_required_files",
        deserialize_with = "deserialize_nonempty_strings"
    )]
    pub required_files: NonEmpty<String>,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            engine: default_engine(),
            plan_file: default_plan_file(),
            required_files: default_required_files(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("infra")
}

fn default_engine() -> String {
    "tofu".to_string()
}

fn default_plan_file() -> String {
    "tfplan".to_string()
}

fn default_required_files() -> NonEmpty<String> {
    NonEmpty::from((
        "main.tf".to_string(),
        vec!["variables.tf".to_string(), "terraform.tfvars".to_string()],
    ))
}
