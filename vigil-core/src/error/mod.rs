//! Error types and handling framework.
//!
//! Errors are grouped by domain:
//! - [`VigilError`] - top-level error type
//!   - [`NetworkError`] - transport and HTTP failures
//!   - [`ConfigError`] - configuration loading and validation
//!   - [`AuthError`] - OAuth exchange and token handling
//!
//! ```
//! use vigil_core::error::{NetworkError, VigilError};
//!
//! let error: VigilError = NetworkError::Timeout { timeout_ms: 5000 }.into();
//! assert!(error.severity().is_recoverable());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error severity levels for categorizing errors.
///
/// - `Fatal`: the operation cannot be retried without intervention
/// - `Recoverable`: retrying (e.g. a fresh `connect`) may succeed
/// - `Warning`: non-critical, worth logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Unrecoverable error requiring attention.
    Fatal,

    /// Error that may succeed when retried.
    #[default]
    Recoverable,

    /// Non-critical issue.
    Warning,
}

impl ErrorSeverity {
    /// Returns true if this error is recoverable (not fatal).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }

    /// Returns true if this error is fatal.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Returns the severity as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Recoverable => "RECOVERABLE",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod auth;
mod config;
mod network;

pub use auth::AuthError;
pub use config::ConfigError;
pub use network::NetworkError;

/// Top-level error type for Vigil.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VigilError {
    /// Network-related error.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Authentication error.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

impl VigilError {
    /// Returns the severity of the wrapped error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network(e) => e.severity(),
            Self::Config(_) => ErrorSeverity::Fatal,
            Self::Auth(e) => e.severity(),
        }
    }

    /// Returns the category name of the wrapped error.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network",
            Self::Config(_) => "Config",
            Self::Auth(_) => "Auth",
        }
    }
}

/// Result alias using [`VigilError`].
pub type Result<T> = std::result::Result<T, VigilError>;
