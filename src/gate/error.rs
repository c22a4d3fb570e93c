//! Error types for the gate engine.

use thiserror::Error;

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Errors that can occur while configuring or resolving the gate.
#[derive(Debug, Clone, Error)]
pub enum GateError {
    /// IP address parsing error.
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// CIDR parsing error.
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),

    /// No allow list was configured and no module supplied one.
    #[error("no allow list configured")]
    MissingAllowConfiguration,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl GateError {
    /// Check if this error came from parsing address or CIDR data.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::InvalidAddress(_) | Self::InvalidCidr(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GateError::InvalidAddress("256.0.0.1".to_string());
        assert_eq!(err.to_string(), "invalid IP address: 256.0.0.1");

        let err = GateError::InvalidCidr("10.0.0.0/40".to_string());
        assert_eq!(err.to_string(), "invalid CIDR notation: 10.0.0.0/40");

        assert_eq!(
            GateError::MissingAllowConfiguration.to_string(),
            "no allow list configured"
        );
    }

    #[test]
    fn test_is_parse_error() {
        assert!(GateError::InvalidAddress("x".to_string()).is_parse_error());
        assert!(GateError::InvalidCidr("x".to_string()).is_parse_error());
        assert!(!GateError::MissingAllowConfiguration.is_parse_error());
    }
}
