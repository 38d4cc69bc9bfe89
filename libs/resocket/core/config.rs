use super::gate::CallbackGate;
use super::manager::CloseNotice;
use crate::traits::*;
use std::sync::Arc;

pub(crate) type MessageCallback<T> = Box<dyn FnMut(T) + Send>;
pub(crate) type ErrorCallback = Box<dyn FnMut(ResocketError) + Send>;
pub(crate) type CloseCallback = Box<dyn FnMut(CloseNotice) + Send>;

/// Registered handlers, invoked only through the callback gate
pub(crate) struct Callbacks<T> {
    pub(crate) on_message: MessageCallback<T>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) on_close: Option<CloseCallback>,
}

impl<T> Callbacks<T> {
    pub(crate) fn message(&mut self, gate: &CallbackGate, payload: T) {
        let handler = &mut self.on_message;
        gate.run(|| handler(payload));
    }

    pub(crate) fn error(&mut self, gate: &CallbackGate, error: ResocketError) {
        if let Some(handler) = self.on_error.as_mut() {
            gate.run(|| handler(error));
        }
    }

    pub(crate) fn close(&mut self, gate: &CallbackGate, notice: CloseNotice) {
        if let Some(handler) = self.on_close.as_mut() {
            gate.run(|| handler(notice));
        }
    }
}

/// Everything the connection task needs, assembled by the builder
pub(crate) struct ManagerConfig<T> {
    /// WebSocket URL (ws:// or wss://)
    pub(crate) endpoint: String,

    /// Transport used for every attempt
    pub(crate) connector: Arc<dyn Connector>,

    /// Frame decoder producing the payload handed to `on_message`
    pub(crate) decoder: Box<dyn FrameDecoder<T>>,

    /// Reconnection policy (default: 10s fixed delay, 5 attempts)
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    pub(crate) callbacks: Callbacks<T>,
}
