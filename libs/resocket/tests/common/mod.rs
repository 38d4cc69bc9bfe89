//! Common test utilities for resocket integration tests
//!
//! - [`FakeConnector`]: scripted in-memory transport for lifecycle tests on a
//!   paused clock
//! - [`MockWsServer`]: a real WebSocket server on 127.0.0.1 for the
//!   tokio-tungstenite path
//! - [`recording_manager`]: a manager whose callbacks record into a channel

#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use resocket::{
    CloseNotice, ConnectionManager, Connector, ReconnectionStrategy, ResocketError, Socket,
    WsMessage,
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Outcome of one scripted connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Accept,
    Refuse,
}

/// Server side of an accepted fake connection
pub struct FakePeer {
    to_client: fmpsc::UnboundedSender<resocket::Result<WsMessage>>,
    from_client: fmpsc::UnboundedReceiver<WsMessage>,
}

impl FakePeer {
    pub fn push_text(&self, text: &str) {
        let _ = self.to_client.unbounded_send(Ok(WsMessage::Text(text.to_string())));
    }

    pub fn push_error(&self, detail: &str) {
        let _ = self
            .to_client
            .unbounded_send(Err(ResocketError::WebSocket(detail.to_string())));
    }

    /// Next frame the client wrote, `None` once the client side is gone
    pub async fn next_sent(&mut self) -> Option<WsMessage> {
        self.from_client.next().await
    }

    /// A frame the client already wrote, without waiting
    pub fn try_sent(&mut self) -> Option<WsMessage> {
        self.from_client.try_next().ok().flatten()
    }

    /// Close the connection from the server side
    pub fn hang_up(self) {
        drop(self);
    }
}

struct FakeInner {
    plans: Mutex<VecDeque<Plan>>,
    attempts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    connect_delay: Duration,
    peers_tx: mpsc::UnboundedSender<FakePeer>,
}

/// Scripted transport: each `connect` consumes the next [`Plan`], refusing
/// once the script runs out
#[derive(Clone)]
pub struct FakeConnector {
    inner: Arc<FakeInner>,
}

impl FakeConnector {
    pub fn new(plans: Vec<Plan>) -> (Self, mpsc::UnboundedReceiver<FakePeer>) {
        Self::with_connect_delay(plans, Duration::ZERO)
    }

    /// Every attempt takes `connect_delay` before it resolves
    pub fn with_connect_delay(
        plans: Vec<Plan>,
        connect_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<FakePeer>) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let connector = Self {
            inner: Arc::new(FakeInner {
                plans: Mutex::new(plans.into()),
                attempts: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                connect_delay,
                peers_tx,
            }),
        };
        (connector, peers_rx)
    }

    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _endpoint: &str) -> resocket::Result<Socket> {
        let inner = &self.inner;
        inner.attempts.fetch_add(1, Ordering::SeqCst);
        let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !inner.connect_delay.is_zero() {
            tokio::time::sleep(inner.connect_delay).await;
        }
        inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        let plan = inner.plans.lock().pop_front().unwrap_or(Plan::Refuse);
        match plan {
            Plan::Refuse => Err(ResocketError::WebSocket("connection refused".into())),
            Plan::Accept => {
                let (to_client, inbound) = fmpsc::unbounded();
                let (outbound, from_client) = fmpsc::unbounded::<WsMessage>();
                let _ = inner.peers_tx.send(FakePeer {
                    to_client,
                    from_client,
                });
                let sink = outbound.sink_map_err(|e| ResocketError::ChannelSend(e.to_string()));
                Ok(Socket::new(Box::pin(sink), Box::pin(inbound)))
            }
        }
    }
}

/// Everything a manager reported, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Message(serde_json::Value),
    Error(ResocketError),
    Close(CloseNotice),
}

/// Build a JSON manager against `connector` that records every callback
pub fn recording_manager(
    endpoint: &str,
    connector: impl Connector,
    strategy: impl ReconnectionStrategy + 'static,
) -> (ConnectionManager, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let on_message = tx.clone();
    let on_error = tx.clone();
    let on_close = tx;

    let manager = resocket::builder()
        .endpoint(endpoint)
        .on_message(move |value: serde_json::Value| {
            let _ = on_message.send(Event::Message(value));
        })
        .on_error(move |e| {
            let _ = on_error.send(Event::Error(e));
        })
        .on_close(move |notice| {
            let _ = on_close.send(Event::Close(notice));
        })
        .connector(connector)
        .reconnect_strategy(strategy)
        .build()
        .expect("manager should build inside a runtime");

    (manager, rx)
}

/// Wait for the next close notice, skipping errors; panics on a message
pub async fn next_close(events: &mut mpsc::UnboundedReceiver<Event>) -> CloseNotice {
    loop {
        match events.recv().await.expect("event channel closed") {
            Event::Close(notice) => return notice,
            Event::Error(_) => continue,
            Event::Message(value) => panic!("unexpected message: {}", value),
        }
    }
}

/// A real WebSocket server for testing
///
/// Every connection first receives the greeting frames, then has its text and
/// binary frames echoed back.
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    kick: Arc<Notify>,
    connections: Arc<AtomicUsize>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server
    pub async fn start(greeting: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let kick = Arc::new(Notify::new());
        let connections = Arc::new(AtomicUsize::new(0));

        let accept_shutdown = Arc::clone(&shutdown);
        let accept_kick = Arc::clone(&kick);
        let accept_connections = Arc::clone(&connections);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                accept_connections.fetch_add(1, Ordering::SeqCst);
                                let kick = Arc::clone(&accept_kick);
                                let greeting = greeting.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, greeting, kick).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = accept_shutdown.notified() => break,
                }
            }
        });

        Self {
            addr,
            shutdown,
            kick,
            connections,
        }
    }

    async fn handle_connection(stream: tokio::net::TcpStream, greeting: Vec<String>, kick: Arc<Notify>) {
        use tokio_tungstenite::accept_async;
        use tokio_tungstenite::tungstenite::Message;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        for frame in greeting {
            if write.send(Message::Text(frame)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            if msg.is_text() || msg.is_binary() {
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = kick.notified() => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Connections accepted so far
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Close every open connection, keep listening
    pub fn drop_connections(&self) {
        self.kick.notify_waiters();
    }

    /// Stop accepting connections
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
        self.kick.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Poll `condition` every 10ms until it holds or `limit` passes
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
