//! REST client for the relay's HTTP endpoints.
//!
//! Covers the OAuth code exchange, token verification, account lookup and
//! logout. The WebSocket side lives in [`crate::relay`].

mod client;

pub use client::{RelayApiClient, TokenResponse, TokenVerifier};
