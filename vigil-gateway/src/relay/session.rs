//! Binding of an authenticated credential to the relay connection.

use super::connection::RelayConnection;
use super::state::ConnectionId;
use crate::rest::TokenVerifier;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};
use vigil_core::Credential;
use vigil_core::config::RelayConfig;
use vigil_core::error::NetworkError;

/// Errors returned by [`SessionBinding`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The credential is empty or whitespace only.
    #[error("[Session] Credential is empty")]
    EmptyCredential,

    /// The verifier reported the credential as invalid.
    #[error("[Session] Credential was rejected by the relay")]
    CredentialRejected,

    /// The verifier could not be reached.
    #[error("[Session] Credential verification failed: {0}")]
    Verification(#[source] NetworkError),
}

/// Ties the lifetime of a relay connection to an authenticated credential.
///
/// Binding connects, binding again rebinds (the previous connection is torn
/// down first) and unbinding disconnects.
#[derive(Debug)]
pub struct SessionBinding {
    connection: RelayConnection,
    credential: Mutex<Option<Credential>>,
}

impl SessionBinding {
    /// Creates an unbound session with a fresh connection manager.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self::with_connection(RelayConnection::new(config))
    }

    /// Creates an unbound session over an existing connection manager.
    #[must_use]
    pub fn with_connection(connection: RelayConnection) -> Self {
        Self {
            connection,
            credential: Mutex::new(None),
        }
    }

    /// Returns the connection manager, for registering subscribers and
    /// observers.
    #[must_use]
    pub fn connection(&self) -> &RelayConnection {
        &self.connection
    }

    /// Returns the bound credential.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.credential.lock().clone()
    }

    /// Returns true if a credential is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.credential.lock().is_some()
    }

    /// Binds `credential` and opens a connection addressed with it.
    ///
    /// A blank credential is rejected without touching the current binding.
    pub fn bind(&self, credential: Credential) -> Result<ConnectionId, SessionError> {
        if credential.is_blank() {
            warn!("Refusing to bind an empty credential");
            return Err(SessionError::EmptyCredential);
        }

        let rebinding = self.credential.lock().replace(credential.clone()).is_some();
        let id = self.connection.connect(&credential);
        info!(connection_id = %id, rebinding, "Session bound");

        Ok(id)
    }

    /// Asks `verifier` about `credential` first and binds only if it is
    /// accepted. Neither a rejection nor a verifier failure connects.
    pub async fn bind_verified<V>(
        &self,
        credential: Credential,
        verifier: &V,
    ) -> Result<ConnectionId, SessionError>
    where
        V: TokenVerifier + ?Sized,
    {
        if credential.is_blank() {
            warn!("Refusing to verify an empty credential");
            return Err(SessionError::EmptyCredential);
        }

        match verifier.verify(&credential).await {
            Ok(true) => self.bind(credential),
            Ok(false) => {
                warn!("Credential rejected by the relay");
                Err(SessionError::CredentialRejected)
            }
            Err(e) => {
                warn!(error = %e, "Credential verification failed");
                Err(SessionError::Verification(e))
            }
        }
    }

    /// Disconnects and forgets the credential. A no-op when unbound.
    pub fn unbind(&self) {
        let Some(_previous) = self.credential.lock().take() else {
            return;
        };

        self.connection.disconnect();
        info!("Session unbound");
    }
}
