//! Authentication error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the OAuth redirect flow and the token exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    /// The authorization server or the relay reported an OAuth error.
    #[error("[Auth] OAuth error '{code}'{}", description.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    OAuth {
        /// OAuth error code (e.g. `invalid_grant`).
        code: String,
        /// Optional human-readable description.
        description: Option<String>,
    },

    /// The token response did not carry an access token.
    #[error("[Auth] No access token in token response")]
    MissingAccessToken,

    /// The redirect callback did not carry an authorization code.
    #[error("[Auth] No authorization code in callback")]
    MissingCode,

    /// The `state` returned by the callback does not match the one sent.
    #[error("[Auth] OAuth state mismatch")]
    StateMismatch,

    /// The response body could not be interpreted.
    #[error("[Auth] Invalid response: {reason}")]
    InvalidResponse {
        /// Parse failure.
        reason: String,
    },
}

impl AuthError {
    /// Returns the severity of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        match self {
            Self::InvalidResponse { .. } => super::ErrorSeverity::Recoverable,
            _ => super::ErrorSeverity::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_error_display() {
        let error = AuthError::OAuth {
            code: "invalid_grant".to_string(),
            description: Some("code expired".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "[Auth] OAuth error 'invalid_grant': code expired"
        );
    }

    #[test]
    fn test_oauth_error_without_description() {
        let error = AuthError::OAuth {
            code: "access_denied".to_string(),
            description: None,
        };
        assert_eq!(error.to_string(), "[Auth] OAuth error 'access_denied'");
        assert!(error.severity().is_fatal());
    }
}
