//! # Vigil Core
//!
//! Shared types, errors and configuration for the Vigil account monitor.
//!
//! This crate provides:
//! - Error types and severity classification
//! - The opaque [`Credential`] used to address the relay
//! - Typed views of the account, position and P&L payloads
//! - Configuration loading with YAML/TOML/JSON support and environment overrides

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]

/// Error types and handling
pub mod error;

/// Opaque bearer credential
pub mod credential;

/// Account, position and P&L payload views
pub mod account;

/// Configuration management
pub mod config;

pub use credential::Credential;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::account::*;
    pub use crate::config::*;
    pub use crate::credential::Credential;
    pub use crate::error::*;
}
