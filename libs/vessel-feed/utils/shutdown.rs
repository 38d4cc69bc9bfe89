//! Graceful shutdown management

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tracing::info;

struct ShutdownState {
    running: AtomicBool,
    notify: Notify,
}

/// Manages graceful shutdown for long-running processes
///
/// Clones share one state, so a clone handed to a task sees the trigger.
#[derive(Clone)]
pub struct ShutdownManager {
    state: Arc<ShutdownState>,
}

impl ShutdownManager {
    /// Create a new shutdown manager with running state
    pub fn new() -> Self {
        Self {
            state: Arc::new(ShutdownState {
                running: AtomicBool::new(true),
                notify: Notify::new(),
            }),
        }
    }

    /// Spawn a Ctrl+C signal handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal (Ctrl+C)");
                info!("Shutting down gracefully...");
                manager.trigger();
            }
        });
    }

    /// Stop running and wake every waiter
    pub fn trigger(&self) {
        self.state.running.store(false, Ordering::Release);
        self.state.notify.notify_waiters();
    }

    /// Check if the process should continue running
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Resolve once shutdown is triggered
    pub async fn wait(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        // Registered before the check so a trigger in between is not lost
        notified.as_mut().enable();
        if !self.is_running() {
            return;
        }
        notified.await;
    }

    /// Sleep for a duration, but wake early if shutdown is triggered
    ///
    /// Returns `true` if the full duration elapsed.
    pub async fn interruptible_sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => self.is_running(),
            _ = self.wait() => false,
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
