//! Typed dispatch of decoded envelopes to subscribers.
//!
//! Each message type has at most one subscriber. Subscribing again replaces
//! the previous callback; there is no fan-out.

use super::envelope::{Envelope, MessageType};
use super::guard::run_guarded;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Callback receiving the payload of one message type.
pub type Subscriber = Arc<dyn Fn(Value) -> anyhow::Result<()> + Send + Sync>;

/// Result of dispatching one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The subscriber ran and returned `Ok`.
    Delivered,
    /// No subscriber is registered for the type; the envelope was dropped.
    NoSubscriber,
    /// The subscriber returned an error or panicked; it was logged.
    Failed,
}

/// Message type to subscriber table.
///
/// Cloning yields another handle to the same table.
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    subscribers: Arc<RwLock<HashMap<MessageType, Subscriber>>>,
}

impl std::fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self.subscribers.read();
        let mut kinds: Vec<_> = subscribers.keys().map(MessageType::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("DispatchRegistry")
            .field("subscribed", &kinds)
            .finish()
    }
}

impl DispatchRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `kind`, replacing any previous subscriber.
    pub fn subscribe<F>(&self, kind: MessageType, callback: F)
    where
        F: Fn(Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        if self.subscribers.write().insert(kind, Arc::new(callback)).is_some() {
            debug!(kind = %kind, "Replaced subscriber");
        }
    }

    /// Registers a callback that receives the payload deserialized into `T`.
    ///
    /// A payload that does not deserialize counts as a subscriber failure.
    ///
    /// ```
    /// use vigil_core::account::PnlSnapshot;
    /// use vigil_gateway::relay::{DispatchRegistry, MessageType};
    ///
    /// let registry = DispatchRegistry::new();
    /// registry.subscribe_typed(MessageType::Pnl, |pnl: PnlSnapshot| {
    ///     println!("net {:?}", pnl.net_pnl);
    ///     Ok(())
    /// });
    /// assert!(registry.is_subscribed(MessageType::Pnl));
    /// ```
    pub fn subscribe_typed<T, F>(&self, kind: MessageType, callback: F)
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(kind, move |payload| {
            let typed: T = serde_json::from_value(payload).map_err(|e| {
                anyhow::anyhow!("{kind} payload does not match expected shape: {e}")
            })?;
            callback(typed)
        });
    }

    /// Removes the subscriber for `kind`. Returns true if one was registered.
    pub fn unsubscribe(&self, kind: MessageType) -> bool {
        self.subscribers.write().remove(&kind).is_some()
    }

    /// Returns true if a subscriber is registered for `kind`.
    #[must_use]
    pub fn is_subscribed(&self, kind: MessageType) -> bool {
        self.subscribers.read().contains_key(&kind)
    }

    /// Delivers `envelope` to the subscriber of its type.
    ///
    /// The table lock is released before the callback runs, so a callback may
    /// subscribe, unsubscribe or disconnect. Errors and panics from the
    /// callback are logged here and never propagate.
    pub fn dispatch(&self, envelope: Envelope) -> DispatchOutcome {
        let Envelope { kind, payload } = envelope;
        let subscriber = self.subscribers.read().get(&kind).cloned();

        let Some(subscriber) = subscriber else {
            debug!(kind = %kind, "No subscriber, dropping envelope");
            return DispatchOutcome::NoSubscriber;
        };

        match run_guarded(|| subscriber(payload)) {
            Ok(()) => DispatchOutcome::Delivered,
            Err(failure) => {
                error!(kind = %kind, error = %failure, "Subscriber failed");
                DispatchOutcome::Failed
            }
        }
    }
}
