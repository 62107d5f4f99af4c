// ABOUTME: Infrastructure lifecycle state markers for the type state pattern.
// ABOUTME: Planned states carry their plan artifact; the final state carries outputs.

use std::path::PathBuf;

use super::outputs::InfraOutputs;

/// Nothing checked yet.
/// Available actions: `validate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Uninitialized;

/// Required declaration files are present.
/// Available actions: `init()`, `outputs()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated;

/// Engine initialized (providers and modules installed).
/// Available actions: `plan()`, `destroy()`, `outputs()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// A saved plan on disk plus whatever the engine printed while planning.
#[derive(Debug, Clone)]
pub struct PlanArtifact {
    pub path: PathBuf,
    pub output: String,
}

/// Plan found no drift.
/// Available actions: `apply()`
#[derive(Debug, Clone)]
pub struct PlanClean(pub(crate) PlanArtifact);

/// Plan found pending changes.
/// Available actions: `apply()`
#[derive(Debug, Clone)]
pub struct PlanPending(pub(crate) PlanArtifact);

/// Saved plan applied.
/// Available actions: `outputs()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Applied;

/// Infrastructure destroyed. Terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Destroyed;

/// Outputs fetched and parsed. Terminal.
#[derive(Debug, Clone)]
pub struct OutputsFetched(pub(crate) InfraOutputs);

pub(crate) mod sealed {
    pub trait Sealed {}

    impl Sealed for super::PlanClean {}
    impl Sealed for super::PlanPending {}
    impl Sealed for super::Validated {}
    impl Sealed for super::Initialized {}
    impl Sealed for super::Applied {}
}

/// States holding a saved plan that `apply()` can consume.
pub trait Planned: sealed::Sealed {
    fn artifact(&self) -> &PlanArtifact;
}

impl Planned for PlanClean {
    fn artifact(&self) -> &PlanArtifact {
        &self.0
    }
}

impl Planned for PlanPending {
    fn artifact(&self) -> &PlanArtifact {
        &self.0
    }
}

/// States from which reading outputs is meaningful.
///
/// Reading outputs only needs the state backend, so `Validated` qualifies
/// without an `init`.
pub trait OutputsSource: sealed::Sealed {}

impl OutputsSource for Validated {}
impl OutputsSource for Initialized {}
impl OutputsSource for Applied {}
