// ABOUTME: Orchestration flows sequencing the release stages.
// ABOUTME: Library side of the CLI commands; takes the seams as parameters for testing.

mod deploy;
mod health;
mod infra;
mod interrupt;

pub use deploy::{DeployReport, deploy};
pub use health::verify;
pub use infra::{ApplyReport, InfraFlow, PlanReport};
pub use interrupt::{CtrlC, Interrupt, NoInterrupt};
