//! Toast notifications
//!
//! The subscription reports connection trouble as toasts and leaves their
//! display to whoever implements [`Notifier`].

use crossbeam_channel::{Receiver, Sender};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub body: String,
}

impl Toast {
    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Fire-and-forget toast sink
///
/// Called from the connection task, so implementations must not block.
pub trait Notifier: Send + Sync + 'static {
    fn show(&self, toast: Toast);
}

/// Writes toasts to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => error!("{}: {}", toast.title, toast.body),
        }
    }
}

/// Forwards toasts to another thread, typically a UI loop
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: Sender<Toast>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, Receiver<Toast>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn show(&self, toast: Toast) {
        // Nobody is listening anymore
        let _ = self.tx.send(toast);
    }
}
