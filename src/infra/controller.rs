// ABOUTME: Infrastructure controller parameterized by lifecycle state.
// ABOUTME: Holds the resolved settings every engine invocation needs.

use std::path::{Path, PathBuf};

use snafu::ResultExt;

use crate::config::Config;

use super::error::{InfraError, InfraStage, SpawnSnafu};
use super::runner::{CommandRunner, InfraCommandResult, Invocation, StdioMode};
use super::state::Uninitialized;

/// Resolved engine settings for one infrastructure directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraSettings {
    pub dir: PathBuf,
    pub engine: String,
    pub plan_file: String,
    pub required_files: Vec<String>,
    /// Stream engine output instead of capturing it.
    pub verbose: bool,
}

impl InfraSettings {
    pub fn from_config(config: &Config, project_dir: &Path, verbose: bool) -> Self {
        Self {
            dir: config.infra_dir(project_dir),
            engine: config.infra.engine.clone(),
            plan_file: config.infra.plan_file.clone(),
            required_files: config.infra.required_files.iter().cloned().collect(),
            verbose,
        }
    }

    pub fn plan_path(&self) -> PathBuf {
        self.dir.join(&self.plan_file)
    }

    /// Stream wiring for a call that never needs operator input.
    pub(crate) fn quiet_stdio(&self) -> StdioMode {
        if self.verbose {
            StdioMode::Passthrough
        } else {
            StdioMode::Captured
        }
    }
}

/// An infrastructure directory at a known point in its lifecycle.
///
/// Each transition consumes the controller and yields the next state, so
/// out-of-order calls (applying without a plan, for instance) do not compile.
#[derive(Debug)]
pub struct Infra<S> {
    pub(crate) settings: InfraSettings,
    pub(crate) state: S,
}

impl Infra<Uninitialized> {
    pub fn new(settings: InfraSettings) -> Self {
        Infra {
            settings,
            state: Uninitialized,
        }
    }
}

impl<S> Infra<S> {
    pub fn settings(&self) -> &InfraSettings {
        &self.settings
    }

    pub fn dir(&self) -> &Path {
        &self.settings.dir
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn transition<T>(self, state: T) -> Infra<T> {
        Infra {
            settings: self.settings,
            state,
        }
    }

    pub(crate) fn invocation(&self, args: Vec<String>, stdio: StdioMode) -> Invocation {
        Invocation {
            program: self.settings.engine.clone(),
            args,
            cwd: self.settings.dir.clone(),
            stdio,
        }
    }

    /// Run one engine call. Exit codes are left to the caller.
    pub(crate) async fn run_engine<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
        stage: InfraStage,
        invocation: Invocation,
    ) -> Result<InfraCommandResult, InfraError> {
        tracing::info!(stage = %stage, "running {}", invocation.display());
        let result = runner.run(&invocation).await.context(SpawnSnafu {
            stage,
            program: invocation.program.clone(),
        })?;
        tracing::debug!(stage = %stage, exit_code = ?result.exit_code, "engine exited");
        Ok(result)
    }

    /// Run one engine call that must exit zero.
    pub(crate) async fn run_checked<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
        stage: InfraStage,
        invocation: Invocation,
    ) -> Result<InfraCommandResult, InfraError> {
        let result = self.run_engine(runner, stage, invocation).await?;
        if !result.success() {
            return Err(InfraError::ToolFailed {
                stage,
                code: result.exit_code,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }
}
