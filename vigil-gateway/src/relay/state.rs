//! Connection identity, state and close causes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier of one connection instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub(crate) fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the inner ID value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle state of a connection instance.
///
/// ```text
/// Idle --connect()--> Connecting --transport opens--> Open
/// Connecting --transport fails--> Closed
/// Open --disconnect(), remote close or transport error--> Closed
/// ```
///
/// `Closed` is terminal; the next `connect()` creates a fresh instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection has been requested yet.
    #[default]
    Idle,
    /// Transport establishment in progress.
    Connecting,
    /// Transport open, frames are being dispatched.
    Open,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns true if the connection is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if the state is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Why a connection instance reached `Closed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseCause {
    /// Closed by `disconnect()` or by a rebind.
    Local,
    /// Closed by the relay, or the stream ended.
    Remote {
        /// Close code from the relay's close frame, if one was sent.
        code: Option<u16>,
        /// Close reason text; empty when none was sent.
        reason: String,
    },
    /// Closed after a transport failure; the error observer fired first.
    Failed,
}

impl CloseCause {
    /// Returns true if the close was requested locally.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for CloseCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "closed locally"),
            Self::Remote { code: Some(code), reason } if !reason.is_empty() => {
                write!(f, "closed by relay ({code}: {reason})")
            }
            Self::Remote { code: Some(code), .. } => write!(f, "closed by relay ({code})"),
            Self::Remote { code: None, .. } => write!(f, "closed by relay"),
            Self::Failed => write!(f, "transport failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
        assert_eq!(a.to_string(), format!("conn-{}", a.as_u64()));
    }

    #[test]
    fn test_state_predicates() {
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(ConnectionState::Closed.is_terminal());
        assert!(!ConnectionState::Idle.is_terminal());
    }

    #[test]
    fn test_close_cause_display() {
        assert_eq!(CloseCause::Local.to_string(), "closed locally");
        assert_eq!(
            CloseCause::Remote {
                code: Some(1008),
                reason: "Invalid token".to_string()
            }
            .to_string(),
            "closed by relay (1008: Invalid token)"
        );
        assert_eq!(
            CloseCause::Remote {
                code: None,
                reason: String::new()
            }
            .to_string(),
            "closed by relay"
        );
        assert!(CloseCause::Local.is_local());
        assert!(!CloseCause::Failed.is_local());
    }
}
