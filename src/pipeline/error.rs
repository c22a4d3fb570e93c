//! Stage error types and result aliases.

use std::fmt;

/// Result type alias for stage operations.
pub type StageResult<T> = Result<T, StageError>;

/// Errors that can occur during stage operations.
#[derive(Debug, Clone)]
pub enum StageError {
    /// Configuration error.
    ConfigError(String),

    /// Stage is in an invalid state for the requested operation.
    InvalidState {
        /// Current state of the stage.
        current: String,
        /// Expected state for the operation.
        expected: String,
    },

    /// Per-request configuration resolution failed.
    ResolveFailed(String),

    /// Generic internal error.
    Internal(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "configuration error: {msg}"),
            Self::InvalidState { current, expected } => {
                write!(f, "invalid state: current={current}, expected={expected}")
            },
            Self::ResolveFailed(msg) => write!(f, "resolve failed: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for StageError {}
