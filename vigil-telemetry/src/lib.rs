//! # Vigil Telemetry
//!
//! Logging for the Vigil account monitor.
//!
//! This crate provides:
//! - Structured logging with JSON, pretty and compact formats
//! - Optional rotating log files
//! - Masking of bearer tokens and relay credentials in log output

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Logging configuration and initialization
pub mod logging;

/// Sensitive data masking
pub mod masking;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat, LogOutput, RotationConfig, init_logging};
    pub use crate::masking::SensitiveDataMasker;
}
