// ABOUTME: State transition methods for the infrastructure lifecycle.
// ABOUTME: Each method consumes self and returns the next state on success.

use serde::Serialize;

use super::confirm::{ApplyApproval, DestroyApproval};
use super::controller::Infra;
use super::error::{InfraError, InfraStage};
use super::outputs::InfraOutputs;
use super::runner::{CommandRunner, InfraCommandResult, StdioMode};
use super::state::{
    Applied, Destroyed, Initialized, OutputsFetched, OutputsSource, PlanArtifact, PlanClean,
    PlanPending, Planned, Uninitialized, Validated,
};

/// Plan exit code meaning "succeeded, changes present".
pub const PLAN_EXIT_CHANGES: i32 = 2;

/// What a plan found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    NoChange,
    ChangesPending,
}

/// Interpret a plan result run with `-detailed-exitcode`.
///
/// Exit 0 is a clean plan and exit 2 is a successful plan with changes;
/// anything else is a tool failure.
pub fn classify_plan(result: &InfraCommandResult) -> Result<PlanStatus, InfraError> {
    match result.exit_code {
        Some(0) => Ok(PlanStatus::NoChange),
        Some(PLAN_EXIT_CHANGES) => Ok(PlanStatus::ChangesPending),
        code => Err(InfraError::ToolFailed {
            stage: InfraStage::Plan,
            code,
            stderr: result.stderr.clone(),
        }),
    }
}

/// Result of a successful plan.
#[derive(Debug)]
pub enum PlanOutcome {
    NoChange(Infra<PlanClean>),
    ChangesPending(Infra<PlanPending>),
}

impl PlanOutcome {
    pub fn status(&self) -> PlanStatus {
        match self {
            PlanOutcome::NoChange(_) => PlanStatus::NoChange,
            PlanOutcome::ChangesPending(_) => PlanStatus::ChangesPending,
        }
    }

    pub fn artifact(&self) -> &PlanArtifact {
        match self {
            PlanOutcome::NoChange(infra) => infra.state.artifact(),
            PlanOutcome::ChangesPending(infra) => infra.state.artifact(),
        }
    }

    /// Apply the saved plan whichever way the plan came out.
    pub async fn apply<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
        approval: ApplyApproval,
    ) -> Result<Infra<Applied>, InfraError> {
        match self {
            PlanOutcome::NoChange(infra) => infra.apply(runner, approval).await,
            PlanOutcome::ChangesPending(infra) => infra.apply(runner, approval).await,
        }
    }
}

// =============================================================================
// Uninitialized -> Validated
// =============================================================================

impl Infra<Uninitialized> {
    /// Check the directory and every required declaration file.
    ///
    /// No subprocess is spawned. All missing files are reported together.
    pub fn validate(self) -> Result<Infra<Validated>, InfraError> {
        let dir = &self.settings.dir;
        if !dir.is_dir() {
            return Err(InfraError::DirectoryMissing { path: dir.clone() });
        }

        let missing: Vec<String> = self
            .settings
            .required_files
            .iter()
            .filter(|name| !dir.join(name).is_file())
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(InfraError::MissingFiles { missing });
        }

        tracing::debug!("infrastructure directory {} is complete", dir.display());
        Ok(self.transition(Validated))
    }
}

// =============================================================================
// Validated -> Initialized
// =============================================================================

impl Infra<Validated> {
    /// Install providers and modules, upgrading within constraints.
    pub async fn init<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
    ) -> Result<Infra<Initialized>, InfraError> {
        let mut args = vec!["init".to_string(), "-upgrade".to_string()];
        let stdio = self.settings.quiet_stdio();
        if stdio == StdioMode::Captured {
            args.push("-no-color".to_string());
        }

        let invocation = self.invocation(args, stdio);
        self.run_checked(runner, InfraStage::Init, invocation)
            .await?;
        Ok(self.transition(Initialized))
    }
}

// =============================================================================
// Initialized -> PlanClean | PlanPending | Destroyed
// =============================================================================

impl Infra<Initialized> {
    /// Compute a plan and save it to the plan file.
    pub async fn plan<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
    ) -> Result<PlanOutcome, InfraError> {
        let mut args = vec![
            "plan".to_string(),
            "-detailed-exitcode".to_string(),
            format!("-out={}", self.settings.plan_file),
        ];
        let stdio = self.settings.quiet_stdio();
        if stdio == StdioMode::Captured {
            args.push("-no-color".to_string());
        }

        let invocation = self.invocation(args, stdio);
        let result = self
            .run_engine(runner, InfraStage::Plan, invocation)
            .await?;
        let status = classify_plan(&result)?;

        let artifact = PlanArtifact {
            path: self.settings.plan_path(),
            output: result.stdout,
        };

        Ok(match status {
            PlanStatus::NoChange => PlanOutcome::NoChange(self.transition(PlanClean(artifact))),
            PlanStatus::ChangesPending => {
                PlanOutcome::ChangesPending(self.transition(PlanPending(artifact)))
            }
        })
    }

    /// Tear down everything the directory declares.
    ///
    /// Requires a [`DestroyApproval`], which only exists once the operator
    /// has confirmed or auto-approval was requested. Without auto-approval
    /// the engine's own prompt is attached to the terminal.
    pub async fn destroy<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
        approval: DestroyApproval,
    ) -> Result<Infra<Destroyed>, InfraError> {
        let mut args = vec!["destroy".to_string()];
        let stdio = if approval.auto_approved() {
            args.push("-auto-approve".to_string());
            self.settings.quiet_stdio()
        } else {
            StdioMode::Interactive
        };

        let invocation = self.invocation(args, stdio);
        self.run_checked(runner, InfraStage::Destroy, invocation)
            .await?;
        Ok(self.transition(Destroyed))
    }
}

// =============================================================================
// PlanClean | PlanPending -> Applied
// =============================================================================

impl<S: Planned> Infra<S> {
    /// Apply the saved plan file, not a fresh plan.
    ///
    /// A saved plan is applied without an engine prompt; the
    /// [`ApplyApproval`] is the confirmation.
    pub async fn apply<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
        approval: ApplyApproval,
    ) -> Result<Infra<Applied>, InfraError> {
        let mut args = vec!["apply".to_string()];
        if approval.auto_approved() {
            args.push("-auto-approve".to_string());
        }
        args.push(self.settings.plan_file.clone());

        let invocation = self.invocation(args, self.settings.quiet_stdio());
        self.run_checked(runner, InfraStage::Apply, invocation)
            .await?;
        Ok(self.transition(Applied))
    }
}

// =============================================================================
// Validated | Initialized | Applied -> OutputsFetched
// =============================================================================

impl<S: OutputsSource> Infra<S> {
    /// Read declared outputs as JSON. Parsing is all-or-nothing.
    pub async fn outputs<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
    ) -> Result<Infra<OutputsFetched>, InfraError> {
        let args = vec!["output".to_string(), "-json".to_string()];
        let invocation = self.invocation(args, StdioMode::Captured);
        let result = self
            .run_checked(runner, InfraStage::Output, invocation)
            .await?;
        let outputs = InfraOutputs::parse(&result.stdout)?;
        tracing::debug!(count = outputs.len(), "parsed infrastructure outputs");
        Ok(self.transition(OutputsFetched(outputs)))
    }
}

impl Infra<OutputsFetched> {
    pub fn outputs_ref(&self) -> &InfraOutputs {
        &self.state.0
    }

    pub fn into_outputs(self) -> InfraOutputs {
        self.state.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(code: Option<i32>) -> InfraCommandResult {
        InfraCommandResult {
            exit_code: code,
            stdout: String::new(),
            stderr: "boom".to_string(),
        }
    }

    #[test]
    fn plan_exit_zero_is_no_change() {
        assert_eq!(classify_plan(&result(Some(0))).unwrap(), PlanStatus::NoChange);
    }

    #[test]
    fn plan_exit_two_is_changes_pending() {
        assert_eq!(
            classify_plan(&result(Some(2))).unwrap(),
            PlanStatus::ChangesPending
        );
    }

    #[test]
    fn plan_other_exits_are_tool_failures() {
        for code in [Some(1), Some(3), Some(127), None] {
            let err = classify_plan(&result(code)).unwrap_err();
            match err {
                InfraError::ToolFailed {
                    stage,
                    code: got,
                    stderr,
                } => {
                    assert_eq!(stage, InfraStage::Plan);
                    assert_eq!(got, code);
                    assert_eq!(stderr, "boom");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
