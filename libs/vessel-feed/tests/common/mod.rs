//! Common test utilities for vessel-feed integration tests
//!
//! - [`ScriptedFeed`]: in-memory transport that hands every accepted
//!   connection to the test as a [`FeedPeer`]
//! - [`frame`]: JSON text of a vessel frame array

#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use resocket::{Connector, ResocketError, Socket, WsMessage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Server side of an accepted connection
pub struct FeedPeer {
    to_client: fmpsc::UnboundedSender<resocket::Result<WsMessage>>,
    from_client: fmpsc::UnboundedReceiver<WsMessage>,
}

impl FeedPeer {
    pub fn push_text(&self, text: &str) {
        let _ = self.to_client.unbounded_send(Ok(WsMessage::Text(text.to_string())));
    }

    pub fn push_error(&self, detail: &str) {
        let _ = self
            .to_client
            .unbounded_send(Err(ResocketError::WebSocket(detail.to_string())));
    }

    pub async fn next_sent(&mut self) -> Option<WsMessage> {
        self.from_client.next().await
    }

    /// Every frame the client already wrote
    pub fn drain_sent(&mut self) -> Vec<WsMessage> {
        let mut sent = Vec::new();
        while let Ok(Some(frame)) = self.from_client.try_next() {
            sent.push(frame);
        }
        sent
    }

    pub fn hang_up(self) {
        drop(self);
    }
}

/// Accepts the first `accepts` attempts, refuses the rest
#[derive(Clone)]
pub struct ScriptedFeed {
    remaining: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
    peers_tx: mpsc::UnboundedSender<FeedPeer>,
}

impl ScriptedFeed {
    pub fn new(accepts: usize) -> (Self, mpsc::UnboundedReceiver<FeedPeer>) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let feed = Self {
            remaining: Arc::new(AtomicUsize::new(accepts)),
            attempts: Arc::new(AtomicUsize::new(0)),
            peers_tx,
        };
        (feed, peers_rx)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedFeed {
    async fn connect(&self, _endpoint: &str) -> resocket::Result<Socket> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let accepted = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !accepted {
            return Err(ResocketError::WebSocket("connection refused".into()));
        }

        let (to_client, inbound) = fmpsc::unbounded();
        let (outbound, from_client) = fmpsc::unbounded::<WsMessage>();
        let _ = self.peers_tx.send(FeedPeer {
            to_client,
            from_client,
        });
        let sink = outbound.sink_map_err(|e| ResocketError::ChannelSend(e.to_string()));
        Ok(Socket::new(Box::pin(sink), Box::pin(inbound)))
    }
}

/// JSON array of fixes, one `(mmsi, lat, lon)` per vessel
pub fn frame(vessels: &[(&str, f64, f64)]) -> String {
    let fixes: Vec<serde_json::Value> = vessels
        .iter()
        .map(|(mmsi, lat, lon)| {
            serde_json::json!({
                "mmsi": mmsi,
                "lat": lat,
                "lon": lon,
                "cog": 0,
                "sog": 0,
                "heading": 0
            })
        })
        .collect();
    serde_json::Value::Array(fixes).to_string()
}
