use thiserror::Error;

/// A single configuration validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Unified error type for pathrank.
#[derive(Error, Debug, Clone)]
pub enum PathRankError {
    /// Counter key failed validation (empty after normalization).
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Inbound path failed normalization.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Increment delta must be non-negative.
    #[error("Invalid delta: {0}")]
    InvalidDelta(i64),

    /// The backing store could not serve the operation in time.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The caller cancelled the whole batch.
    #[error("Operation cancelled")]
    Cancelled,

    /// Operation timed out (ETIMEDOUT-class failures).
    #[error("Operation timed out: {0}")]
    TimedOut(String),

    /// Connection-level failure talking to a probe target.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Probe target answered with a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Config parse/serialization error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Configuration validation failed.
    #[error("Validation error: {}", .0.iter().map(|i| format!("{}: {}", i.field, i.message)).collect::<Vec<_>>().join("; "))]
    ValidationError(Vec<ValidationIssue>),
}

impl PathRankError {
    /// Client-visible kind name, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            PathRankError::InvalidKey(_) => "InvalidKey",
            PathRankError::InvalidPath(_) => "InvalidPath",
            PathRankError::InvalidDelta(_) => "InvalidDelta",
            PathRankError::StoreUnavailable(_) => "StoreUnavailable",
            PathRankError::Cancelled => "Cancelled",
            PathRankError::TimedOut(_) => "Timeout",
            PathRankError::ConnectionError(_) => "ConnectionError",
            PathRankError::DecodeError(_) => "DecodeError",
            PathRankError::ApiError { .. } => "ApiError",
            PathRankError::IoError(_) => "IoError",
            PathRankError::ParseError(_) => "ParseError",
            PathRankError::ValidationError(_) => "ValidationError",
        }
    }

    /// HTTP status code this error maps to at the service boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            PathRankError::InvalidKey(_)
            | PathRankError::InvalidPath(_)
            | PathRankError::InvalidDelta(_)
            | PathRankError::ValidationError(_) => 400,
            PathRankError::StoreUnavailable(_) => 503,
            PathRankError::Cancelled => 499,
            PathRankError::TimedOut(_) => 504,
            PathRankError::ApiError { status, .. } => *status,
            _ => 500,
        }
    }

    /// Check if this error is transient. The core never retries on its
    /// own; this classification is for callers with a retry budget.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PathRankError::TimedOut(_)
                | PathRankError::ConnectionError(_)
                | PathRankError::StoreUnavailable(_)
                | PathRankError::ApiError {
                    status: 408 | 429 | 502 | 503 | 504,
                    ..
                }
        )
    }
}

// === Conversion Implementations ===

macro_rules! impl_from_error {
    ($err_type:ty, $arm:pat => $body:expr) => {
        impl From<$err_type> for PathRankError {
            fn from(err: $err_type) -> Self {
                match err {
                    $arm => $body,
                }
            }
        }
    };
}

impl_from_error!(std::io::Error, e => match e.kind() {
    std::io::ErrorKind::TimedOut => PathRankError::TimedOut(e.to_string()),
    std::io::ErrorKind::InvalidInput => PathRankError::InvalidPath(e.to_string()),
    _ => PathRankError::IoError(e.to_string()),
});

impl_from_error!(reqwest::Error, e => if e.is_timeout() {
    PathRankError::TimedOut(e.to_string())
} else if e.is_connect() {
    PathRankError::ConnectionError(format!("Target unreachable: {}", e))
} else if e.is_decode() {
    PathRankError::DecodeError(e.to_string())
} else {
    PathRankError::ConnectionError(e.to_string())
});

impl_from_error!(serde_json::Error, e => PathRankError::DecodeError(e.to_string()));
impl_from_error!(toml::de::Error, e => PathRankError::ParseError(e.to_string()));

/// Result type alias for operations that can fail with PathRankError.
pub type PathRankResult<T> = Result<T, PathRankError>;
