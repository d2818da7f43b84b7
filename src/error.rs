//! Error types for the harness.

use thiserror::Error;

/// Main error type for harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("SDK call failed: {0}")]
    SdkCallFailed(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Unknown state key: {0}")]
    UnknownKey(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Event bridge is full (capacity {0})")]
    BridgeFull(usize),

    #[error("Event bridge is closed")]
    BridgeClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl HarnessError {
    /// Shorthand for a collaborator failure.
    pub fn sdk(reason: impl Into<String>) -> Self {
        HarnessError::SdkCallFailed(reason.into())
    }

    /// Shorthand for a payload that does not have the expected shape.
    pub fn malformed(reason: impl Into<String>) -> Self {
        HarnessError::MalformedEvent(reason.into())
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        HarnessError::Config(e.to_string())
    }
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
