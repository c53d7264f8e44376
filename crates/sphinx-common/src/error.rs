//! Common error types for Sphinx components.

use thiserror::Error;

/// Common errors across Sphinx components
#[derive(Debug, Error)]
pub enum SphinxError {
    /// Audio input does not match the fixed PCM format
    #[error("Unsupported audio format: {0}")]
    Format(String),

    /// Named resource could not be located
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource exists but could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input (dimensions, gain, unsupported character, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed builder state
    #[error("Construction error: {0}")]
    Construction(String),

    /// PNG/WAV serialization failure
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used throughout Sphinx
pub type SphinxResult<T> = Result<T, SphinxError>;

impl SphinxError {
    /// Returns the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Format(_) => 65,
            Self::NotFound(_) => 66,
            Self::Io(_) => 74,
            Self::InvalidArgument(_) => 64,
            Self::Construction(_) => 70,
            Self::Encoding(_) => 70,
            Self::Config(_) => 78,
        }
    }

    /// Returns true if regenerating the challenge may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
