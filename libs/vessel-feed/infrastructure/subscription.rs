//! Live vessel subscription
//!
//! Owns one [`ConnectionManager`] per endpoint for its whole lifetime. Every
//! decoded frame replaces the published [`FleetSnapshot`]; connection trouble
//! is reported as toasts through the [`Notifier`].

use super::config::FeedConfig;
use super::notifications::{Notifier, Toast};
use crate::domain::{FleetSnapshot, VesselFix, VesselFixFrame, ViewportRequest};
use chrono::Utc;
use parking_lot::Mutex;
use resocket::{
    CloseNotice, ConnectionManager, Connector, FixedDelay, FrameSender, Metrics,
    ReconnectionStrategy, ResocketError, WsMessage,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const ERROR_TITLE: &str = "Error retrieving data from server";
const ERROR_BODY: &str =
    "Please reload the app or try again soon. Detailed error can be found in the logs";
const CLOSE_TITLE: &str = "Connection lost to server";

pub struct VesselSubscription {
    endpoint: String,
    manager: Mutex<Option<ConnectionManager>>,
    sender: FrameSender,
    fixes: watch::Receiver<FleetSnapshot>,
}

impl VesselSubscription {
    /// Subscribe with the default policy (10s delay, at most 5 attempts)
    ///
    /// Must be called inside a tokio runtime.
    pub fn subscribe(endpoint: impl Into<String>, notifier: impl Notifier) -> resocket::Result<Self> {
        Self::start(endpoint.into(), Arc::new(notifier), FixedDelay::default(), None)
    }

    /// Subscribe to the configured endpoint with the configured retry policy
    pub fn from_config(config: &FeedConfig, notifier: impl Notifier) -> resocket::Result<Self> {
        Self::start(
            config.endpoint.clone(),
            Arc::new(notifier),
            config.reconnect_strategy(),
            None,
        )
    }

    /// Subscribe over a custom transport
    pub fn with_transport(
        endpoint: impl Into<String>,
        notifier: impl Notifier,
        strategy: impl ReconnectionStrategy + 'static,
        connector: Arc<dyn Connector>,
    ) -> resocket::Result<Self> {
        Self::start(endpoint.into(), Arc::new(notifier), strategy, Some(connector))
    }

    fn start(
        endpoint: String,
        notifier: Arc<dyn Notifier>,
        strategy: impl ReconnectionStrategy + 'static,
        connector: Option<Arc<dyn Connector>>,
    ) -> resocket::Result<Self> {
        let (fixes_tx, fixes) = watch::channel(FleetSnapshot::default());
        let on_error_notifier = Arc::clone(&notifier);
        let on_close_notifier = notifier;

        let mut builder = resocket::builder()
            .endpoint(endpoint.clone())
            .on_message(move |frames: Vec<VesselFixFrame>| {
                let snapshot = FleetSnapshot::from_frames(frames, Utc::now());
                debug!("Fleet update: {} vessels", snapshot.len());
                fixes_tx.send_replace(snapshot);
            })
            .on_error(move |e| on_error_notifier.show(error_toast(&e)))
            .on_close(move |notice| on_close_notifier.show(close_toast(notice)))
            .reconnect_strategy(strategy);
        if let Some(connector) = connector {
            builder = builder.shared_connector(connector);
        }

        let manager = builder.build()?;
        info!("Subscribed to vessel feed at {}", endpoint);

        Ok(Self {
            endpoint,
            sender: manager.sender(),
            manager: Mutex::new(Some(manager)),
            fixes,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Observable fleet: `changed()` resolves on every frame
    pub fn latest_fixes(&self) -> watch::Receiver<FleetSnapshot> {
        self.fixes.clone()
    }

    pub fn current_fixes(&self) -> Vec<VesselFix> {
        self.fixes.borrow().fixes.clone()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        self.fixes.borrow().clone()
    }

    /// Send a raw payload; `false` unless the connection is open
    pub fn send(&self, payload: impl Into<WsMessage>) -> bool {
        self.sender.send(payload)
    }

    pub fn send_viewport(&self, request: &ViewportRequest) -> bool {
        match request.to_payload() {
            Ok(payload) => self.sender.send(payload),
            Err(e) => {
                warn!("Viewport not serializable, not sent: {}", e);
                false
            }
        }
    }

    /// Sender for publishers that outlive a borrow of the subscription
    pub fn sender(&self) -> FrameSender {
        self.sender.clone()
    }

    pub fn is_open(&self) -> bool {
        self.sender.is_open()
    }

    pub fn is_subscribed(&self) -> bool {
        self.manager.lock().is_some()
    }

    /// `None` once unsubscribed
    pub fn metrics(&self) -> Option<Metrics> {
        self.manager.lock().as_ref().map(ConnectionManager::metrics)
    }

    /// Close the connection; no callback fires afterwards. Idempotent.
    pub fn unsubscribe(&self) {
        let manager = self.manager.lock().take();
        if let Some(manager) = manager {
            info!("Unsubscribing from {}", self.endpoint);
            manager.close();
        }
    }

    /// Unsubscribe and wait for the connection task to exit
    pub async fn shutdown(self) {
        let manager = self.manager.lock().take();
        if let Some(manager) = manager {
            info!("Unsubscribing from {}", self.endpoint);
            manager.shutdown().await;
        }
    }
}

impl Drop for VesselSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

pub(crate) fn error_toast(error: &ResocketError) -> Toast {
    debug!("Feed error: {}", error);
    Toast::error(ERROR_TITLE, ERROR_BODY)
}

/// The attempt number is `retry_count` as delivered with the close, so the
/// first retry reads "attempt 1" and the last one "attempt 5".
pub(crate) fn close_toast(notice: CloseNotice) -> Toast {
    match notice.reconnect_in {
        Some(delay) => Toast::error(
            CLOSE_TITLE,
            format!(
                "Retrying in {} seconds... (attempt {})",
                delay.as_secs(),
                notice.retry_count
            ),
        ),
        None => Toast::error(
            CLOSE_TITLE,
            format!(
                "Gave up after {} attempts. Please reload the app or try again soon.",
                notice.retry_count
            ),
        ),
    }
}
