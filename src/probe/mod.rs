//! Concurrent HTTP probe dispatch for the synthetic load generator.

pub mod runner;
pub mod types;

pub use runner::ProbeRunner;
pub use types::{ProbeFailure, ProbeOutcome, ProbeResult};
