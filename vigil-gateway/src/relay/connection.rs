//! Relay connection lifecycle.
//!
//! A [`RelayConnection`] owns at most one live socket. Each `connect()`
//! creates a fresh instance with its own [`ConnectionId`] and spawns one task
//! that owns the socket, decodes frames in arrival order and dispatches them
//! on that same task. Lifecycle transitions are reported through
//! [`LifecycleObservers`]; nothing is reported through return values.

use super::dispatch::DispatchRegistry;
use super::envelope::{Decoded, decode, decode_bytes};
use super::observer::LifecycleObservers;
use super::state::{CloseCause, ConnectionId, ConnectionState};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, error, info, trace, warn};
use url::Url;
use vigil_core::Credential;
use vigil_core::config::RelayConfig;
use vigil_core::error::NetworkError;

#[derive(Debug)]
struct Lifecycle {
    state: ConnectionState,
    /// Set once the opened observer has returned.
    announced: bool,
    /// A close that arrived while the opened observer was still running.
    deferred_close: Option<CloseCause>,
}

/// Who reports a claimed close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    /// The caller reports it now.
    Report,
    /// The socket task reports it right after the opened observer returns.
    Deferred,
    /// Somebody else already closed the instance.
    AlreadyClosed,
}

/// One connection attempt and, if it succeeds, one open socket.
#[derive(Debug)]
struct Instance {
    id: ConnectionId,
    lifecycle: RwLock<Lifecycle>,
}

impl Instance {
    fn new() -> Self {
        Self {
            id: ConnectionId::generate(),
            lifecycle: RwLock::new(Lifecycle {
                state: ConnectionState::Connecting,
                announced: false,
                deferred_close: None,
            }),
        }
    }

    fn state(&self) -> ConnectionState {
        self.lifecycle.read().state
    }

    fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Moves `Connecting` to `Open`. Returns false if the instance was closed
    /// while the transport was being established.
    fn mark_open(&self) -> bool {
        let mut lifecycle = self.lifecycle.write();
        if lifecycle.state == ConnectionState::Connecting {
            lifecycle.state = ConnectionState::Open;
            true
        } else {
            false
        }
    }

    /// Records that the opened observer has returned and hands back a close
    /// that was claimed in the meantime, for the caller to report.
    fn announce_open(&self) -> Option<CloseCause> {
        let mut lifecycle = self.lifecycle.write();
        lifecycle.announced = true;
        lifecycle.deferred_close.take()
    }

    /// Claims the transition to `Closed`. Exactly one caller gets something
    /// other than `AlreadyClosed`. A close claimed between `mark_open` and
    /// `announce_open` is deferred so observers never see closed before
    /// opened for the same instance.
    fn finish(&self, cause: &CloseCause) -> Finish {
        let mut lifecycle = self.lifecycle.write();
        match lifecycle.state {
            ConnectionState::Closed => Finish::AlreadyClosed,
            ConnectionState::Open if !lifecycle.announced => {
                lifecycle.state = ConnectionState::Closed;
                lifecycle.deferred_close = Some(cause.clone());
                Finish::Deferred
            }
            _ => {
                lifecycle.state = ConnectionState::Closed;
                Finish::Report
            }
        }
    }
}

/// The most recent instance and the signal that stops its task.
#[derive(Debug)]
struct ActiveConnection {
    instance: Arc<Instance>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Debug)]
struct Shared {
    config: RelayConfig,
    registry: DispatchRegistry,
    observers: LifecycleObservers,
    current: Mutex<Option<ActiveConnection>>,
}

/// Everything the socket task needs. Holding these rather than the shared
/// state lets the task notice when every [`RelayConnection`] handle is gone.
struct TaskContext {
    instance: Arc<Instance>,
    registry: DispatchRegistry,
    observers: LifecycleObservers,
    connect_timeout: Duration,
}

/// Handle to the relay connection manager.
///
/// Cloning is cheap and every clone controls the same connection. The
/// manager keeps no global state; construct one per session.
///
/// ```ignore
/// use vigil_core::Credential;
/// use vigil_core::config::RelayConfig;
/// use vigil_gateway::relay::{MessageType, RelayConnection};
///
/// let relay = RelayConnection::new(RelayConfig::default());
/// relay.observers().on_opened(|id| println!("{id} open"));
/// relay.registry().subscribe(MessageType::Positions, |payload| {
///     println!("{payload}");
///     Ok(())
/// });
/// relay.connect(&Credential::new("abc123"));
/// ```
#[derive(Debug, Clone)]
pub struct RelayConnection {
    shared: Arc<Shared>,
}

impl RelayConnection {
    /// Creates a manager with no connection.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                registry: DispatchRegistry::new(),
                observers: LifecycleObservers::new(),
                current: Mutex::new(None),
            }),
        }
    }

    /// Returns the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.shared.config
    }

    /// Returns the subscriber table frames are dispatched through.
    #[must_use]
    pub fn registry(&self) -> &DispatchRegistry {
        &self.shared.registry
    }

    /// Returns the lifecycle observer slots.
    #[must_use]
    pub fn observers(&self) -> &LifecycleObservers {
        &self.shared.observers
    }

    /// Opens a new connection addressed with `credential` and returns its id
    /// immediately.
    ///
    /// A connection that is still live is torn down first; its closed
    /// observer fires before this method returns. Establishment failures are
    /// reported later through the error observer followed by the closed
    /// observer.
    ///
    /// The socket task is spawned on the current Tokio runtime. Without one,
    /// the attempt fails right away through the same observers.
    pub fn connect(&self, credential: &Credential) -> ConnectionId {
        self.disconnect();

        let instance = Arc::new(Instance::new());
        let id = instance.id;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let displaced = self.shared.current.lock().replace(ActiveConnection {
            instance: Arc::clone(&instance),
            shutdown_tx: Some(shutdown_tx),
        });
        if let Some(displaced) = displaced {
            Self::close_locally(&self.shared.observers, displaced);
        }

        info!(
            connection_id = %id,
            relay = %self.shared.config.url,
            "Connecting to relay"
        );

        let endpoint = self.shared.config.endpoint(credential);
        let context = TaskContext {
            instance,
            registry: self.shared.registry.clone(),
            observers: self.shared.observers.clone(),
            connect_timeout: self.shared.config.connect_timeout(),
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run_connection(context, endpoint, shutdown_rx));
            }
            Err(e) => {
                fail(
                    &context,
                    &NetworkError::ConnectionFailed {
                        reason: format!("no async runtime available: {e}"),
                    },
                );
            }
        }

        id
    }

    /// Closes the current connection. A no-op when there is none or it is
    /// already closed.
    ///
    /// Safe to call from inside any subscriber or observer.
    pub fn disconnect(&self) {
        let active = {
            let mut current = self.shared.current.lock();
            current.as_mut().map(|active| ActiveConnection {
                instance: Arc::clone(&active.instance),
                shutdown_tx: active.shutdown_tx.take(),
            })
        };

        if let Some(active) = active {
            Self::close_locally(&self.shared.observers, active);
        }
    }

    /// Returns true if the current connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared
            .current
            .lock()
            .as_ref()
            .is_some_and(|active| active.instance.is_open())
    }

    /// Returns the state of the most recent connection, or `Idle` if
    /// `connect()` was never called.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared
            .current
            .lock()
            .as_ref()
            .map_or(ConnectionState::Idle, |active| active.instance.state())
    }

    /// Returns the id of the most recent connection.
    #[must_use]
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.shared
            .current
            .lock()
            .as_ref()
            .map(|active| active.instance.id)
    }

    fn close_locally(observers: &LifecycleObservers, active: ActiveConnection) {
        let ActiveConnection {
            instance,
            shutdown_tx,
        } = active;

        let finish = instance.finish(&CloseCause::Local);
        if finish == Finish::AlreadyClosed {
            return;
        }

        if let Some(shutdown_tx) = shutdown_tx {
            let _ = shutdown_tx.send(());
        }

        info!(connection_id = %instance.id, "Relay connection closed locally");
        if finish == Finish::Report {
            observers.notify_closed(instance.id, &CloseCause::Local);
        }
    }
}

/// Reports a transport failure unless the instance is already closed.
fn fail(context: &TaskContext, network_error: &NetworkError) {
    let id = context.instance.id;
    if context.instance.finish(&CloseCause::Failed) == Finish::Report {
        error!(connection_id = %id, error = %network_error, "Relay connection failed");
        context.observers.notify_error(id, network_error);
        context.observers.notify_closed(id, &CloseCause::Failed);
    }
}

fn close_remotely(context: &TaskContext, cause: &CloseCause) {
    let id = context.instance.id;
    if context.instance.finish(cause) == Finish::Report {
        info!(connection_id = %id, cause = %cause, "Relay connection closed by remote");
        context.observers.notify_closed(id, cause);
    }
}

/// The shutdown signal also resolves when every handle is dropped; that case
/// still counts as a local close.
fn close_on_shutdown(context: &TaskContext) {
    if context.instance.finish(&CloseCause::Local) == Finish::Report {
        debug!(connection_id = %context.instance.id, "Relay handle dropped, closing");
        context.observers.notify_closed(context.instance.id, &CloseCause::Local);
    }
}

async fn run_connection(
    context: TaskContext,
    endpoint: Result<Url, NetworkError>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let id = context.instance.id;

    let url = match endpoint {
        Ok(url) => url,
        Err(e) => {
            fail(&context, &e);
            return;
        }
    };

    let connecting = timeout(context.connect_timeout, connect_async(url.as_str()));
    let mut ws_stream = tokio::select! {
        biased;

        _ = &mut shutdown_rx => {
            debug!(connection_id = %id, "Shutdown before transport opened");
            close_on_shutdown(&context);
            return;
        }

        result = connecting => match result {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                fail(&context, &NetworkError::ConnectionFailed { reason: e.to_string() });
                return;
            }
            Err(_) => {
                let timeout_ms = u64::try_from(context.connect_timeout.as_millis()).unwrap_or(u64::MAX);
                fail(&context, &NetworkError::Timeout { timeout_ms });
                return;
            }
        }
    };

    if !context.instance.mark_open() {
        debug!(connection_id = %id, "Closed while connecting, dropping transport");
        let _ = ws_stream.close(None).await;
        return;
    }

    info!(connection_id = %id, "Relay connection open");
    context.observers.notify_opened(id);

    if let Some(cause) = context.instance.announce_open() {
        context.observers.notify_closed(id, &cause);
        let _ = ws_stream.close(None).await;
        return;
    }

    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                debug!(connection_id = %id, "Shutdown signal received");
                close_on_shutdown(&context);
                let _ = sink.close().await;
                break;
            }

            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(&context, decode(&text)),
                Some(Ok(Message::Binary(bytes))) => handle_frame(&context, decode_bytes(&bytes)),
                // Pongs to incoming pings are queued by tungstenite and flushed
                // on the next read.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    let cause = frame.map_or(
                        CloseCause::Remote { code: None, reason: String::new() },
                        |frame| CloseCause::Remote {
                            code: Some(frame.code.into()),
                            reason: frame.reason.into_owned(),
                        },
                    );
                    close_remotely(&context, &cause);
                    let _ = sink.close().await;
                    break;
                }
                None => {
                    close_remotely(&context, &CloseCause::Remote { code: None, reason: String::new() });
                    break;
                }
                Some(Err(e)) => {
                    fail(&context, &NetworkError::WebSocket { reason: e.to_string() });
                    break;
                }
            }
        }
    }

    trace!(connection_id = %id, "Relay connection task finished");
}

fn handle_frame(context: &TaskContext, decoded: Decoded) {
    let id = context.instance.id;

    // A subscriber may have disconnected while earlier frames of the same
    // burst were being dispatched.
    if !context.instance.is_open() {
        trace!(connection_id = %id, "Connection closed, dropping frame");
        return;
    }

    match decoded {
        Decoded::Envelope(envelope) => {
            let kind = envelope.kind;
            let outcome = context.registry.dispatch(envelope);
            trace!(connection_id = %id, kind = %kind, outcome = ?outcome, "Dispatched envelope");
        }
        Decoded::UnknownType(name) => {
            debug!(connection_id = %id, kind = %name, "Dropping frame of unknown type");
        }
        Decoded::Malformed(e) => {
            warn!(connection_id = %id, error = %e, "Dropping malformed frame");
        }
    }
}
