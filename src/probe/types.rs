use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single probe failed. Failures are isolated per target and
/// never abort sibling probes.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ProbeFailure {
    #[error("probe timed out: {0}")]
    Timeout(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("non-success status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),
}

impl ProbeFailure {
    /// Stable kind name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFailure::Timeout(_) => "Timeout",
            ProbeFailure::Connection(_) => "ConnectionError",
            ProbeFailure::Status { .. } => "Status",
            ProbeFailure::Decode(_) => "DecodeError",
        }
    }
}

impl From<reqwest::Error> for ProbeFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeFailure::Timeout(err.to_string())
        } else if err.is_connect() {
            ProbeFailure::Connection(err.to_string())
        } else if err.is_decode() {
            ProbeFailure::Decode(err.to_string())
        } else {
            ProbeFailure::Connection(err.to_string())
        }
    }
}

/// Outcome of one probe: a decoded JSON payload or a failure marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success(serde_json::Value),
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success(_))
    }
}

/// Result of one probe, positioned at its submission index. Callers
/// correlate `result[i]` with `input[i]`, so `index` always equals the
/// position in the returned sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub index: usize,
    pub outcome: ProbeOutcome,
}
