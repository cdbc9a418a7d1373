//! # Vigil Gateway
//!
//! Network communication for the Vigil account monitor.
//!
//! This crate provides:
//! - The relay connection core: lifecycle management, envelope decoding,
//!   typed dispatch and session binding
//! - A REST client for the relay's token exchange and verification endpoints
//! - OAuth redirect helpers for the trading platform
//!
//! # Architecture
//!
//! - `relay` - one persistent socket per session, frames routed by type
//! - `rest` - request/response calls against the relay API
//! - `auth` - authorization URL construction and callback parsing
//!
//! # Example
//!
//! ```ignore
//! use vigil_core::Credential;
//! use vigil_core::config::RelayConfig;
//! use vigil_gateway::relay::{MessageType, SessionBinding};
//!
//! let session = SessionBinding::new(RelayConfig::default());
//! session.connection().registry().subscribe(MessageType::Pnl, |payload| {
//!     println!("{payload}");
//!     Ok(())
//! });
//! session.bind(Credential::new("abc123"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

/// Relay connection core
pub mod relay;

/// Relay REST client
pub mod rest;

/// OAuth redirect helpers
pub mod auth;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::{authorization_url, generate_state, parse_callback};
    pub use crate::relay::{
        CloseCause, ConnectionId, ConnectionState, DispatchOutcome, DispatchRegistry,
        Envelope, LifecycleObservers, MessageType, RelayConnection, SessionBinding,
        SessionError,
    };
    pub use crate::rest::{RelayApiClient, TokenResponse, TokenVerifier};
}
