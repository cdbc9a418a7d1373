//! Lifecycle observer slots.

use super::guard::run_guarded;
use super::state::{CloseCause, ConnectionId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::error;
use vigil_core::error::NetworkError;

type OpenedFn = Arc<dyn Fn(ConnectionId) + Send + Sync>;
type ClosedFn = Arc<dyn Fn(ConnectionId, &CloseCause) + Send + Sync>;
type ErrorFn = Arc<dyn Fn(ConnectionId, &NetworkError) + Send + Sync>;

/// One callback slot each for opened, closed and errored transitions.
///
/// Setting a slot replaces its previous callback. Cloning yields another
/// handle to the same slots. Panics inside a callback are logged and
/// swallowed.
#[derive(Clone, Default)]
pub struct LifecycleObservers {
    opened: Arc<RwLock<Option<OpenedFn>>>,
    closed: Arc<RwLock<Option<ClosedFn>>>,
    errored: Arc<RwLock<Option<ErrorFn>>>,
}

impl std::fmt::Debug for LifecycleObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleObservers")
            .field("opened", &self.opened.read().is_some())
            .field("closed", &self.closed.read().is_some())
            .field("errored", &self.errored.read().is_some())
            .finish()
    }
}

impl LifecycleObservers {
    /// Creates empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the callback fired when a connection reaches `Open`.
    pub fn on_opened<F>(&self, callback: F)
    where
        F: Fn(ConnectionId) + Send + Sync + 'static,
    {
        *self.opened.write() = Some(Arc::new(callback));
    }

    /// Sets the callback fired when a connection reaches `Closed`.
    pub fn on_closed<F>(&self, callback: F)
    where
        F: Fn(ConnectionId, &CloseCause) + Send + Sync + 'static,
    {
        *self.closed.write() = Some(Arc::new(callback));
    }

    /// Sets the callback fired on a transport failure, right before the
    /// closed callback.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(ConnectionId, &NetworkError) + Send + Sync + 'static,
    {
        *self.errored.write() = Some(Arc::new(callback));
    }

    /// Empties all three slots.
    pub fn clear(&self) {
        *self.opened.write() = None;
        *self.closed.write() = None;
        *self.errored.write() = None;
    }

    pub(crate) fn notify_opened(&self, id: ConnectionId) {
        let callback = self.opened.read().clone();
        if let Some(callback) = callback
            && let Err(failure) = run_guarded(|| {
                callback(id);
                Ok(())
            })
        {
            error!(connection_id = %id, error = %failure, "Opened observer failed");
        }
    }

    pub(crate) fn notify_closed(&self, id: ConnectionId, cause: &CloseCause) {
        let callback = self.closed.read().clone();
        if let Some(callback) = callback
            && let Err(failure) = run_guarded(|| {
                callback(id, cause);
                Ok(())
            })
        {
            error!(connection_id = %id, error = %failure, "Closed observer failed");
        }
    }

    pub(crate) fn notify_error(&self, id: ConnectionId, network_error: &NetworkError) {
        let callback = self.errored.read().clone();
        if let Some(callback) = callback
            && let Err(failure) = run_guarded(|| {
                callback(id, network_error);
                Ok(())
            })
        {
            error!(connection_id = %id, error = %failure, "Error observer failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_empty_slots_are_noops() {
        let observers = LifecycleObservers::new();
        let id = ConnectionId::generate();
        observers.notify_opened(id);
        observers.notify_closed(id, &CloseCause::Local);
        observers.notify_error(id, &NetworkError::Timeout { timeout_ms: 1 });
    }

    #[test]
    fn test_last_writer_wins() {
        let observers = LifecycleObservers::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&log);
        observers.on_closed(move |_, _| sink.lock().push("first"));
        let sink = Arc::clone(&log);
        observers.on_closed(move |_, cause| {
            assert_eq!(cause, &CloseCause::Failed);
            sink.lock().push("second");
        });

        observers.notify_closed(ConnectionId::generate(), &CloseCause::Failed);
        assert_eq!(*log.lock(), vec!["second"]);
    }

    #[test]
    fn test_panicking_observer_is_contained() {
        let observers = LifecycleObservers::new();
        observers.on_opened(|_| panic!("observer bug"));
        observers.notify_opened(ConnectionId::generate());

        let hits = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&hits);
        observers.on_opened(move |_| *sink.lock() += 1);
        observers.notify_opened(ConnectionId::generate());
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_clear() {
        let observers = LifecycleObservers::new();
        let hits = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&hits);
        observers.on_error(move |_, _| *sink.lock() += 1);
        observers.clear();
        observers.notify_error(
            ConnectionId::generate(),
            &NetworkError::ConnectionFailed {
                reason: "refused".to_string(),
            },
        );
        assert_eq!(*hits.lock(), 0);
    }
}
