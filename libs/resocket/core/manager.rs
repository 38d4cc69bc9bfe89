use super::config::{Callbacks, ManagerConfig};
use super::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use super::gate::CallbackGate;
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Upper bound on flushing a close frame during shutdown
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Delivered to `on_close` after every disconnection
///
/// The retry decision is taken before the notice is built, so
/// `reconnect_in` always reflects what the manager is about to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseNotice {
    /// Reconnection attempts made since the last successful open,
    /// including the one just scheduled
    pub retry_count: usize,
    /// Delay before the scheduled attempt, `None` once retries are exhausted
    pub reconnect_in: Option<Duration>,
}

impl CloseNotice {
    pub fn will_reconnect(&self) -> bool {
        self.reconnect_in.is_some()
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub decode_failures: u64,
    pub reconnects_scheduled: u64,
    pub retry_count: usize,
    pub connection_state: ConnectionState,
}

/// State shared between the handle, its senders and the connection task
struct Shared {
    endpoint: String,
    state: AtomicConnectionState,
    metrics: AtomicMetrics,
    gate: CallbackGate,
    shutdown: Notify,
    retry_count: AtomicUsize,
    finished: AtomicBool,
}

/// Cloneable outbound path of a [`ConnectionManager`]
///
/// Same semantics as [`ConnectionManager::send`]; holding one does not keep
/// the connection alive once the manager is closed or dropped.
#[derive(Clone)]
pub struct FrameSender {
    shared: Arc<Shared>,
    outbound_tx: mpsc::UnboundedSender<WsMessage>,
}

impl FrameSender {
    /// Queue a frame for transmission
    ///
    /// Returns `false` without queueing when the connection is not open or
    /// the manager has been closed. Never blocks.
    pub fn send(&self, payload: impl Into<WsMessage>) -> bool {
        let payload = payload.into();

        if self.shared.gate.is_closed() {
            debug!("Manager for {} is closed, frame not sent", self.shared.endpoint);
            return false;
        }

        let state = self.shared.state.get();
        if state != ConnectionState::Open {
            warn!(
                "WebSocket to {} is {}, frame not sent ({} bytes)",
                self.shared.endpoint,
                state,
                payload.len()
            );
            return false;
        }

        if self.outbound_tx.send(payload).is_err() {
            warn!("Connection task for {} has exited, frame not sent", self.shared.endpoint);
            return false;
        }
        true
    }

    pub fn is_open(&self) -> bool {
        !self.shared.gate.is_closed() && self.shared.state.is_open()
    }
}

/// Owner of one logical connection to one endpoint
///
/// Creating a manager immediately starts connecting on a dedicated tokio
/// task. That task is the connection's event loop: it opens the transport,
/// decodes frames, runs the reconnect timer and invokes the registered
/// callbacks, one at a time and in delivery order.
///
/// Dropping the manager closes it.
pub struct ConnectionManager {
    shared: Arc<Shared>,
    sender: FrameSender,
    task_handle: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Connect to `endpoint` and decode every frame as JSON into `T`
    ///
    /// Uses the default transport and the default policy (10s fixed delay,
    /// 5 attempts). Use [`crate::builder()`] for anything else.
    ///
    /// # Errors
    /// Fails only on an invalid endpoint or when called outside a tokio runtime.
    pub fn create<T, F, E, C>(
        endpoint: impl Into<String>,
        on_message: F,
        on_error: Option<E>,
        on_close: Option<C>,
    ) -> Result<Self>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T) + Send + 'static,
        E: FnMut(ResocketError) + Send + 'static,
        C: FnMut(CloseNotice) + Send + 'static,
    {
        let mut builder = crate::builder().endpoint(endpoint).on_message(on_message);
        if let Some(on_error) = on_error {
            builder = builder.on_error(on_error);
        }
        if let Some(on_close) = on_close {
            builder = builder.on_close(on_close);
        }
        builder.build()
    }

    /// Spawn the connection task. Called by the builder's `build()`.
    pub(crate) fn spawn<T>(config: ManagerConfig<T>) -> Result<Self>
    where
        T: Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            ResocketError::Configuration(format!("connection manager needs a tokio runtime: {}", e))
        })?;

        let shared = Arc::new(Shared {
            endpoint: config.endpoint.clone(),
            state: AtomicConnectionState::new(ConnectionState::Connecting),
            metrics: AtomicMetrics::new(),
            gate: CallbackGate::new(),
            shutdown: Notify::new(),
            retry_count: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
        });

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let task_handle = {
            let shared = Arc::clone(&shared);
            runtime.spawn(async move {
                run_connection(shared, config, outbound_rx).await;
            })
        };

        Ok(Self {
            sender: FrameSender {
                shared: Arc::clone(&shared),
                outbound_tx,
            },
            shared,
            task_handle: Some(task_handle),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.shared.endpoint
    }

    /// Queue a frame for transmission. See [`FrameSender::send`].
    pub fn send(&self, payload: impl Into<WsMessage>) -> bool {
        self.sender.send(payload)
    }

    /// A cloneable sender for other tasks
    pub fn sender(&self) -> FrameSender {
        self.sender.clone()
    }

    /// Tear the connection down for good
    ///
    /// Cancels a pending reconnect, closes the live connection and makes the
    /// manager inert. When this returns no callback is running or will run.
    /// Safe to call repeatedly, including from inside a callback.
    pub fn close(&self) {
        if self.shared.gate.close() {
            info!("Closing connection manager for {}", self.shared.endpoint);
            self.shared.state.set(ConnectionState::Closed);
            self.shared.shutdown.notify_one();
        }
    }

    /// Close and wait for the connection task to finish
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.sender.is_open()
    }

    /// Reconnection attempts made since the last successful open
    pub fn retry_count(&self) -> usize {
        self.shared.retry_count.load(Ordering::Acquire)
    }

    /// True once the manager will never connect again: closed explicitly
    /// or out of retries
    pub fn is_inert(&self) -> bool {
        self.shared.gate.is_closed() || self.shared.finished.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> Metrics {
        let metrics = &self.shared.metrics;
        Metrics {
            messages_sent: metrics.messages_sent(),
            messages_received: metrics.messages_received(),
            decode_failures: metrics.decode_failures(),
            reconnects_scheduled: metrics.reconnects_scheduled(),
            retry_count: self.retry_count(),
            connection_state: self.connection_state(),
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

/// How a single open connection ended
enum ConnectionOutcome {
    /// The transport closed; the retry policy decides what happens next
    Closed,
    /// The manager was closed; exit without retrying
    Shutdown,
}

/// Connection task: connect, drive, decide, wait, repeat
async fn run_connection<T>(
    shared: Arc<Shared>,
    config: ManagerConfig<T>,
    mut outbound_rx: mpsc::UnboundedReceiver<WsMessage>,
) where
    T: Send + 'static,
{
    let ManagerConfig {
        endpoint,
        connector,
        decoder,
        reconnect_strategy,
        mut callbacks,
    } = config;
    let mut retry_count = 0usize;

    loop {
        if shared.gate.is_closed() {
            break;
        }

        shared.state.set(ConnectionState::Connecting);
        debug!("Connecting to {}", endpoint);

        let attempt = tokio::select! {
            biased;
            _ = shared.shutdown.notified() => break,
            attempt = connector.connect(&endpoint) => attempt,
        };

        match attempt {
            Ok(socket) => {
                if shared.gate.is_closed() {
                    break;
                }
                info!("Connected to {}", endpoint);
                shared.state.set(ConnectionState::Open);
                retry_count = 0;
                shared.retry_count.store(0, Ordering::Release);

                let outcome = drive_connection(
                    &shared,
                    socket,
                    &*decoder,
                    &mut callbacks,
                    &mut outbound_rx,
                )
                .await;

                shared.state.set(ConnectionState::Closed);
                discard_unsent(&endpoint, &mut outbound_rx);

                if let ConnectionOutcome::Shutdown = outcome {
                    break;
                }
                info!("Connection to {} closed", endpoint);
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", endpoint, e);
                shared.state.set(ConnectionState::Closed);
                callbacks.error(&shared.gate, e);
            }
        }

        // An explicit close never runs the retry policy
        if shared.gate.is_closed() {
            break;
        }

        // Decide first, then notify
        let reconnect_in = reconnect_strategy.next_delay(retry_count);
        if reconnect_in.is_some() {
            retry_count += 1;
            shared.retry_count.store(retry_count, Ordering::Release);
            shared.metrics.increment_reconnects();
        }
        let notice = CloseNotice {
            retry_count,
            reconnect_in,
        };

        match reconnect_in {
            Some(delay) => {
                info!(
                    "Reconnecting to {} in {:?} (attempt {})",
                    endpoint, delay, retry_count
                );
                callbacks.close(&shared.gate, notice);

                tokio::select! {
                    biased;
                    _ = shared.shutdown.notified() => {
                        debug!("Pending reconnect to {} cancelled", endpoint);
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => {
                error!(
                    "Max retries reached ({}), giving up on {}",
                    retry_count, endpoint
                );
                callbacks.close(&shared.gate, notice);
                break;
            }
        }
    }

    shared.state.set(ConnectionState::Closed);
    shared.finished.store(true, Ordering::Release);
    debug!("Connection task for {} exiting", endpoint);
}

/// Pump one open connection until it closes or the manager shuts down
async fn drive_connection<T>(
    shared: &Shared,
    socket: Socket,
    decoder: &dyn FrameDecoder<T>,
    callbacks: &mut Callbacks<T>,
    outbound_rx: &mut mpsc::UnboundedReceiver<WsMessage>,
) -> ConnectionOutcome
where
    T: Send + 'static,
{
    let Socket {
        mut sink,
        mut stream,
    } = socket;

    loop {
        tokio::select! {
            biased;

            _ = shared.shutdown.notified() => {
                debug!("Shutdown requested, closing connection to {}", shared.endpoint);
                let _ = tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await;
                return ConnectionOutcome::Shutdown;
            }

            frame = stream.next() => match frame {
                Some(Ok(frame)) => {
                    shared.metrics.increment_received();
                    match decoder.decode(&frame) {
                        Ok(payload) => callbacks.message(&shared.gate, payload),
                        Err(e) => {
                            shared.metrics.increment_decode_failures();
                            warn!(
                                "Dropping undecodable frame from {} ({} bytes): {}",
                                shared.endpoint,
                                frame.len(),
                                e
                            );
                        }
                    }
                }
                Some(Err(e)) => {
                    error!("WebSocket error on {}: {}", shared.endpoint, e);
                    callbacks.error(&shared.gate, e);
                }
                None => return ConnectionOutcome::Closed,
            },

            outbound = outbound_rx.recv() => match outbound {
                Some(frame) => {
                    let size = frame.len();
                    match sink.send(frame).await {
                        Ok(()) => {
                            shared.metrics.increment_sent();
                            debug!("Sent {} bytes to {}", size, shared.endpoint);
                        }
                        Err(e) => {
                            error!("Failed to send frame to {}: {}", shared.endpoint, e);
                            callbacks.error(&shared.gate, e);
                        }
                    }
                }
                None => {
                    let _ = tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await;
                    return ConnectionOutcome::Shutdown;
                }
            },
        }
    }
}

/// Frames queued while the connection was open but never written are not
/// carried over to the next connection
fn discard_unsent(endpoint: &str, outbound_rx: &mut mpsc::UnboundedReceiver<WsMessage>) {
    let mut dropped = 0usize;
    while outbound_rx.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        warn!("Discarded {} unsent frame(s) for {}", dropped, endpoint);
    }
}
