// ABOUTME: Infrastructure command flows: plan, apply, destroy, output.
// ABOUTME: Each flow validates, takes the directory lock, then drives the controller.

use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::infra::{
    ApplyApproval, CommandRunner, Confirm, DestroyApproval, Infra, InfraError, InfraLock,
    InfraOutputs, InfraSettings, PlanOutcome, PlanStatus, Validated,
};

use super::interrupt::{Interrupt, NoInterrupt};

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub status: PlanStatus,
    pub plan_path: PathBuf,
    /// Engine output; empty when it was streamed to the terminal.
    pub output: String,
}

impl PlanReport {
    fn from_outcome(outcome: &PlanOutcome) -> Self {
        let artifact = outcome.artifact();
        Self {
            status: outcome.status(),
            plan_path: artifact.path.clone(),
            output: artifact.output.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ApplyReport {
    /// Dry run: the plan was computed and nothing applied.
    Planned(PlanReport),
    Applied {
        plan: PlanReport,
        outputs: InfraOutputs,
    },
}

/// Drives one infrastructure directory through a complete command.
///
/// An interrupt that fires while the engine runs lets the engine call
/// finish, skips every later stage, releases the lock, and surfaces as
/// [`InfraError::Aborted`].
pub struct InfraFlow<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    settings: InfraSettings,
    force_unlock: bool,
    interrupt: Arc<dyn Interrupt>,
}

impl<'a, R: CommandRunner + ?Sized> InfraFlow<'a, R> {
    pub fn new(runner: &'a R, settings: InfraSettings, force_unlock: bool) -> Self {
        Self {
            runner,
            settings,
            force_unlock,
            interrupt: Arc::new(NoInterrupt),
        }
    }

    pub fn with_interrupt(mut self, interrupt: impl Interrupt + 'static) -> Self {
        self.interrupt = Arc::new(interrupt);
        self
    }

    pub fn settings(&self) -> &InfraSettings {
        &self.settings
    }

    /// Validate the directory, then lock it for `command`.
    fn prepare(
        &self,
        command: &str,
        diag: &mut Diagnostics,
    ) -> Result<(Infra<Validated>, InfraLock)> {
        let validated = Infra::new(self.settings.clone()).validate()?;
        let lock = InfraLock::acquire(validated.dir(), command, self.force_unlock)?;
        if let Some(previous) = lock.broken() {
            diag.warn(Warning::stale_lock_broken(&previous.holder, previous.pid));
        }
        Ok((validated, lock))
    }

    /// Run one engine stage unless cancellation was requested.
    ///
    /// A request that arrives mid-stage waits for the engine to exit, then
    /// aborts. The caller's lock is released when the error propagates.
    async fn stage<T, F>(&self, name: &str, work: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, InfraError>>,
    {
        if self.interrupt.is_requested() {
            tracing::info!("cancelled before {name}");
            return Err(InfraError::Aborted {}.into());
        }

        tokio::pin!(work);
        tokio::select! {
            biased;
            result = &mut work => Ok(result?),
            () = self.interrupt.requested() => {
                tracing::warn!("interrupted during {name}, waiting for the engine to exit");
                let _ = work.await;
                Err(InfraError::Aborted {}.into())
            }
        }
    }

    fn finish(lock: InfraLock, diag: &mut Diagnostics) {
        if let Err(e) = lock.release() {
            diag.warn(Warning::lock_release(e.to_string()));
        }
    }

    /// validate -> init -> plan.
    pub async fn plan(&self, diag: &mut Diagnostics) -> Result<PlanReport> {
        let (validated, lock) = self.prepare("plan", diag)?;
        let outcome = self.init_and_plan(validated).await?;
        let report = PlanReport::from_outcome(&outcome);
        Self::finish(lock, diag);
        Ok(report)
    }

    async fn init_and_plan(&self, validated: Infra<Validated>) -> Result<PlanOutcome> {
        let initialized = self.stage("init", validated.init(self.runner)).await?;
        self.stage("plan", initialized.plan(self.runner)).await
    }

    /// validate -> init -> plan -> confirm -> apply(saved plan) -> outputs.
    ///
    /// A dry run stops after planning. Without `auto_approve` the plan is
    /// shown through `confirm` before anything is applied.
    pub async fn apply(
        &self,
        auto_approve: bool,
        confirm: &dyn Confirm,
        dry_run: bool,
        diag: &mut Diagnostics,
    ) -> Result<ApplyReport> {
        let (validated, lock) = self.prepare("apply", diag)?;
        let outcome = self.init_and_plan(validated).await?;
        let plan = PlanReport::from_outcome(&outcome);

        if dry_run {
            tracing::info!("dry run, not applying {}", plan.plan_path.display());
            Self::finish(lock, diag);
            return Ok(ApplyReport::Planned(plan));
        }

        let approval = ApplyApproval::obtain(auto_approve, confirm, &plan.output)?;
        let applied = self
            .stage("apply", outcome.apply(self.runner, approval))
            .await?;
        let outputs = self
            .stage("output", applied.outputs(self.runner))
            .await?
            .into_outputs();

        Self::finish(lock, diag);
        Ok(ApplyReport::Applied { plan, outputs })
    }

    /// validate -> init -> destroy. The approval is obtained by the caller
    /// before anything here runs.
    pub async fn destroy(&self, approval: DestroyApproval, diag: &mut Diagnostics) -> Result<()> {
        let (validated, lock) = self.prepare("destroy", diag)?;
        let initialized = self.stage("init", validated.init(self.runner)).await?;
        self.stage("destroy", initialized.destroy(self.runner, approval))
            .await?;
        Self::finish(lock, diag);
        Ok(())
    }

    /// validate -> outputs. Reading outputs needs no provider download, so
    /// `init` is skipped.
    pub async fn outputs(&self, diag: &mut Diagnostics) -> Result<InfraOutputs> {
        let (validated, lock) = self.prepare("output", diag)?;
        let outputs = self
            .stage("output", validated.outputs(self.runner))
            .await?
            .into_outputs();
        if outputs.is_empty() {
            tracing::info!("no infrastructure outputs declared");
        }
        Self::finish(lock, diag);
        Ok(outputs)
    }
}
