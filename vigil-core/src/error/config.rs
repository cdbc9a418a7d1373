//! Configuration-related error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error type covering missing fields, invalid values,
/// and file access errors.
///
/// ```
/// use vigil_core::error::ConfigError;
///
/// let error = ConfigError::MissingField {
///     field: "url".to_string(),
///     section: Some("relay".to_string()),
/// };
/// assert!(error.to_string().contains("relay"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Required configuration field is missing.
    #[error("[Config] Missing field '{field}'{}", section.as_ref().map(|s| format!(" in section '{s}'")).unwrap_or_default())]
    MissingField {
        /// Name of the missing field.
        field: String,
        /// Optional section where the field should be.
        section: Option<String>,
    },

    /// Configuration value is invalid.
    #[error("[Config] Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field with the invalid value.
        field: String,
        /// Reason why the value is invalid.
        reason: String,
    },

    /// Configuration file could not be read.
    #[error("[Config] Failed to read file '{path}': {reason}")]
    FileReadError {
        /// Path to the configuration file.
        path: String,
        /// Reason for the read failure.
        reason: String,
    },

    /// Configuration file format is invalid.
    #[error("[Config] Invalid format in '{path}': {reason}")]
    InvalidFormat {
        /// Path to the configuration file.
        path: String,
        /// Reason for the format error.
        reason: String,
    },

    /// Environment variable has an invalid value.
    #[error("[Config] Invalid environment variable '{name}': {reason}")]
    InvalidEnvVar {
        /// Name of the environment variable.
        name: String,
        /// Reason why the value is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a missing field error without a section.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            section: None,
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_with_section() {
        let error = ConfigError::MissingField {
            field: "url".to_string(),
            section: Some("relay".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "[Config] Missing field 'url' in section 'relay'"
        );
    }

    #[test]
    fn test_missing_field_without_section() {
        let error = ConfigError::missing_field("client_id");
        assert_eq!(error.to_string(), "[Config] Missing field 'client_id'");
    }

    #[test]
    fn test_invalid_value() {
        let error = ConfigError::invalid_value("relay.url", "scheme must be ws or wss");
        assert!(error.to_string().contains("relay.url"));
        assert!(error.to_string().contains("ws or wss"));
    }
}
