//! Viewport publishing for the feed server
//!
//! A dedicated task keeps the server informed of what the consumer is
//! looking at:
//!
//! ```text
//! update() ──> watch channel ──> debounce ──┐
//!                                           ├──> FrameSender ──> WebSocket
//!              interval tick ───────────────┘
//! ```
//!
//! The current viewport is resent on every tick, and once more after a burst
//! of updates has been quiet for the debounce period. Ticks keep firing while
//! a burst is still settling. Nothing is sent while the connection is down;
//! the next tick after a reconnect catches up.

use crate::domain::{Bounds, ViewportRequest};
use resocket::FrameSender;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

pub struct ViewportPublisher {
    viewport_tx: watch::Sender<ViewportRequest>,
    handle: Option<JoinHandle<()>>,
}

impl ViewportPublisher {
    /// Spawn the publisher task; must be called inside a tokio runtime
    pub fn spawn(
        sender: FrameSender,
        initial: ViewportRequest,
        interval: Duration,
        debounce: Duration,
    ) -> Self {
        let (viewport_tx, viewport_rx) = watch::channel(initial);
        let handle = tokio::spawn(publisher_task(sender, viewport_rx, interval, debounce));

        Self {
            viewport_tx,
            handle: Some(handle),
        }
    }

    /// Report a new viewport; sent once updates settle
    pub fn update(&self, request: ViewportRequest) {
        self.viewport_tx.send_replace(request);
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        self.viewport_tx
            .send_modify(|request| *request = request.with_bounds(bounds));
    }

    pub fn zoom_in(&self) {
        self.viewport_tx
            .send_modify(|request| *request = request.zoom_in());
    }

    pub fn zoom_out(&self) {
        self.viewport_tx
            .send_modify(|request| *request = request.zoom_out());
    }

    pub fn current(&self) -> ViewportRequest {
        *self.viewport_tx.borrow()
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for ViewportPublisher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn publisher_task(
    sender: FrameSender,
    mut viewport_rx: watch::Receiver<ViewportRequest>,
    interval: Duration,
    debounce: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    // Skip the first immediate tick - wait for the first interval
    ticker.tick().await;
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!("Viewport publisher started with interval: {:?}", interval);

    // Set while a burst of updates is waiting to settle
    let mut pending: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let request = *viewport_rx.borrow();
                publish(&sender, &request);
            }
            changed = viewport_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                pending = Some(Instant::now() + debounce);
            }
            _ = tokio::time::sleep_until(pending.unwrap_or_else(Instant::now)), if pending.is_some() => {
                pending = None;
                let request = *viewport_rx.borrow_and_update();
                publish(&sender, &request);
            }
        }
    }

    debug!("Viewport publisher exiting");
}

fn publish(sender: &FrameSender, request: &ViewportRequest) {
    if !sender.is_open() {
        debug!("Connection down, viewport not sent");
        return;
    }
    match request.to_payload() {
        Ok(payload) => {
            if sender.send(payload) {
                debug!("Viewport sent: zoom {}", request.zoom);
            }
        }
        Err(e) => warn!("Viewport not serializable, skipped: {}", e),
    }
}
