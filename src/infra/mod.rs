// ABOUTME: Infrastructure lifecycle controller driving the IaC engine as a subprocess.
// ABOUTME: Type state pattern makes validate -> init -> plan -> apply ordering compile-time checked.

mod confirm;
mod controller;
mod error;
mod lock;
mod outputs;
mod runner;
mod state;
mod transitions;

pub use confirm::{
    APPLY_PROMPT, ApplyApproval, AutoApprove, AutoDeny, Confirm, DESTROY_PROMPT, DestroyApproval,
    KeypressConfirm,
};
pub use controller::{Infra, InfraSettings};
pub use error::{InfraError, InfraStage};
pub use lock::{InfraLock, LOCK_FILENAME, LockInfo};
pub use outputs::{BUCKET_OUTPUT, DISTRIBUTION_OUTPUT, InfraOutputs};
pub use runner::{CommandRunner, InfraCommandResult, Invocation, StdioMode, TokioCommandRunner};
pub use state::{
    Applied, Destroyed, Initialized, OutputsFetched, OutputsSource, PlanArtifact, PlanClean,
    PlanPending, Planned, Uninitialized, Validated,
};
pub use transitions::{PLAN_EXIT_CHANGES, PlanOutcome, PlanStatus, classify_plan};
