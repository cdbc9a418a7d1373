//! Relay connection core.
//!
//! - [`RelayConnection`] owns the socket lifecycle and reports transitions
//!   to [`LifecycleObservers`]
//! - [`decode`] classifies each inbound frame as an [`Envelope`], an unknown
//!   type, or garbage
//! - [`DispatchRegistry`] routes each envelope to the single subscriber of
//!   its [`MessageType`]
//! - [`SessionBinding`] ties a connection to an authenticated credential
//!
//! ```ignore
//! use vigil_core::Credential;
//! use vigil_core::account::PnlSnapshot;
//! use vigil_core::config::RelayConfig;
//! use vigil_gateway::relay::{MessageType, SessionBinding};
//!
//! let session = SessionBinding::new(RelayConfig::default());
//! let relay = session.connection();
//! relay.observers().on_closed(|id, cause| println!("{id} {cause}"));
//! relay.registry().subscribe_typed(MessageType::Pnl, |pnl: PnlSnapshot| {
//!     println!("net P&L {:?}", pnl.net_pnl);
//!     Ok(())
//! });
//! session.bind(Credential::new("abc123"))?;
//! ```

mod connection;
mod dispatch;
mod envelope;
mod guard;
mod observer;
mod session;
mod state;

pub use connection::RelayConnection;
pub use dispatch::{DispatchOutcome, DispatchRegistry, Subscriber};
pub use envelope::{
    DecodeError, Decoded, Envelope, MessageType, UnknownMessageType, decode, decode_bytes,
};
pub use observer::LifecycleObservers;
pub use session::{SessionBinding, SessionError};
pub use state::{CloseCause, ConnectionId, ConnectionState};
