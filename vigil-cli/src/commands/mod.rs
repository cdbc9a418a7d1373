//! Subcommand implementations.

pub mod auth;
pub mod watch;
