//! Declarative gate configuration.
//!
//! The subset of the gate's options that can be expressed in TOML: literal
//! allow data and the blocked-response fields. Dynamic sources (provider
//! functions, capability modules, custom handlers) are code and arrive via
//! [`super::RawOptions`] instead.

use serde::{Deserialize, Serialize};

use super::codec::{AllowData, AllowEntry};
use super::options::{DEFAULT_RESPONSE_BODY, DEFAULT_RESPONSE_CODE};

/// Declarative configuration for the gate stage.
///
/// Unrecognized keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Allow-list entries, or a single comma-delimited string.
    #[serde(default)]
    pub allow: Option<AllowData>,

    /// Response code staged when a request is blocked.
    #[serde(default = "default_response_code")]
    pub response_code_on_blocked: u16,

    /// Response body staged when a request is blocked.
    #[serde(default = "default_response_body")]
    pub response_body_on_blocked: String,
}

fn default_response_code() -> u16 {
    DEFAULT_RESPONSE_CODE
}

fn default_response_body() -> String {
    DEFAULT_RESPONSE_BODY.to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allow: None,
            response_code_on_blocked: default_response_code(),
            response_body_on_blocked: default_response_body(),
        }
    }
}

impl GateConfig {
    /// Validate the configuration.
    ///
    /// Syntax of individual entries is checked by packing; this catches the
    /// shapes that can never parse.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(AllowData::Entries(entries)) = &self.allow {
            validate_entries(entries)?;
        }
        Ok(())
    }
}

fn validate_entries(entries: &[AllowEntry]) -> Result<(), String> {
    for entry in entries {
        match entry {
            AllowEntry::Literal(text) => {
                if text.trim().is_empty() {
                    return Err("empty entry in allow list".to_string());
                }
            },
            AllowEntry::Addr(_) => {},
            AllowEntry::Group(group) => validate_entries(group)?,
        }
    }
    Ok(())
}
