//! Opaque bearer credential.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bearer token obtained from the OAuth exchange.
///
/// The token has no internal structure as far as Vigil is concerned. It is
/// only ever embedded in the relay address or sent as a bearer header.
/// `Debug` and `Display` never print the value, and the token bytes are
/// wiped when the credential is dropped.
///
/// ```
/// use vigil_core::Credential;
///
/// let credential = Credential::new("abc123");
/// assert_eq!(credential.expose(), "abc123");
/// assert_eq!(format!("{credential:?}"), "Credential([REDACTED])");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token. Only pass this to transports.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the token is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}
