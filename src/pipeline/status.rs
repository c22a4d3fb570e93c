//! Stage status reporting.

/// Represents the current status of a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// Stage is stopped (not yet initialized, or shut down).
    Stopped,

    /// Stage is initialized and processing requests.
    Running,

    /// Stage encountered an error.
    Error {
        /// Error message.
        message: String,
    },
}

impl StageStatus {
    /// Returns `true` if the stage is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if the stage is stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns `true` if the stage has an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}
