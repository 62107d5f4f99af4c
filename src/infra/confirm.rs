// ABOUTME: Operator confirmation for destructive infrastructure actions.
// ABOUTME: Apply and destroy approval tokens can only be obtained through a Confirm strategy.

use console::{Key, Term};
use snafu::ResultExt;
use std::io::{self, IsTerminal};

use super::error::{InfraError, PromptSnafu};

/// Asks the operator a yes/no question.
pub trait Confirm: Send + Sync {
    /// `Ok(true)` to proceed, `Ok(false)` to cancel.
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Single keypress on the controlling terminal.
///
/// Ctrl-C or Escape cancels; any other key proceeds. Refuses to run when
/// stdin is not a terminal, so unattended runs must pass auto-approval.
#[derive(Debug, Clone)]
pub struct KeypressConfirm {
    term: Term,
}

impl KeypressConfirm {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for KeypressConfirm {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm for KeypressConfirm {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        if !io::stdin().is_terminal() || !self.term.is_term() {
            return Err(io::Error::other(
                "stdin is not a terminal; pass --auto-approve to continue",
            ));
        }

        self.term.write_line(prompt)?;
        match self.term.read_key() {
            Ok(Key::CtrlC | Key::Escape) => Ok(false),
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Always proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDeny;

impl Confirm for AutoDeny {
    fn confirm(&self, _prompt: &str) -> io::Result<bool> {
        Ok(false)
    }
}

pub const DESTROY_PROMPT: &str = "This will destroy all declared infrastructure. \
Press any key to continue, or Ctrl-C/Esc to cancel.";

pub const APPLY_PROMPT: &str = "Apply this plan? Press any key to continue, or Ctrl-C/Esc to cancel.";

/// `Ok(true)` when pre-approved, `Ok(false)` when the operator agreed.
fn approve(auto_approve: bool, confirm: &dyn Confirm, prompt: &str) -> Result<bool, InfraError> {
    if auto_approve {
        return Ok(true);
    }
    if confirm.confirm(prompt).context(PromptSnafu)? {
        Ok(false)
    } else {
        Err(InfraError::Aborted {})
    }
}

/// Proof that a destroy was approved.
#[derive(Debug)]
pub struct DestroyApproval {
    auto_approved: bool,
}

impl DestroyApproval {
    /// Approve up front with `auto_approve`, otherwise ask through `confirm`.
    ///
    /// A cancelled prompt is [`InfraError::Aborted`].
    pub fn obtain(auto_approve: bool, confirm: &dyn Confirm) -> Result<Self, InfraError> {
        let auto_approved = approve(auto_approve, confirm, DESTROY_PROMPT)?;
        if auto_approved {
            tracing::info!("destroy auto-approved");
        }
        Ok(Self { auto_approved })
    }

    /// Whether the engine should skip its own prompt as well.
    pub fn auto_approved(&self) -> bool {
        self.auto_approved
    }
}

/// Proof that applying a saved plan was approved.
///
/// The engine never prompts for a saved plan, so this is the only
/// confirmation an apply gets.
#[derive(Debug)]
pub struct ApplyApproval {
    auto_approved: bool,
}

impl ApplyApproval {
    /// Show `plan_output` with the prompt unless `auto_approve` is set.
    pub fn obtain(
        auto_approve: bool,
        confirm: &dyn Confirm,
        plan_output: &str,
    ) -> Result<Self, InfraError> {
        let plan = plan_output.trim();
        let prompt = if plan.is_empty() {
            APPLY_PROMPT.to_string()
        } else {
            format!("{plan}\n\n{APPLY_PROMPT}")
        };
        let auto_approved = approve(auto_approve, confirm, &prompt)?;
        Ok(Self { auto_approved })
    }

    pub fn auto_approved(&self) -> bool {
        self.auto_approved
    }
}
