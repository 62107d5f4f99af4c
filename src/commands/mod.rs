// ABOUTME: Command module aggregator for the skylift CLI.
// ABOUTME: Re-exports the infra, deploy, and health command handlers.

mod deploy;
mod health;
mod infra;

pub use deploy::deploy;
pub use health::health;
pub use infra::infra;

use skylift::config::Config;
use skylift::output::{Output, OutputMode};
use std::path::PathBuf;

/// Everything a command needs from the command line and config file.
pub struct Context {
    pub project_dir: PathBuf,
    pub config: Config,
    pub verbose: bool,
    pub mode: OutputMode,
}

impl Context {
    pub fn output(&self) -> Output {
        Output::new(self.mode)
    }
}
