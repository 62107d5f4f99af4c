// ABOUTME: HTTP health probe for deployed site endpoints.
// ABOUTME: Probes run concurrently with a per-URL timeout and never raise errors.

mod probe;
mod summary;

pub use probe::{Probe, USER_AGENT};
pub use summary::{HealthResult, HealthSummary};
