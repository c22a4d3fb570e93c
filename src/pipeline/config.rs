//! Stage configuration carrier.

/// Raw configuration handed to a stage at init time.
///
/// Hosts that load declarative configuration pass the stage's TOML fragment
/// through here; stages configured programmatically pass an empty carrier.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    /// Raw TOML string (if available).
    raw: Option<String>,
}

impl StageConfig {
    /// Creates a new empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from a raw TOML string.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// Gets the raw configuration string.
    #[must_use]
    pub fn raw_config(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Returns `true` if no configuration was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = StageConfig::new();
        assert!(config.is_empty());
        assert_eq!(config.raw_config(), None);
    }

    #[test]
    fn test_from_raw() {
        let config = StageConfig::from_raw("allow = [\"10.0.0.0/8\"]");
        assert!(!config.is_empty());
        assert_eq!(config.raw_config(), Some("allow = [\"10.0.0.0/8\"]"));
    }
}
