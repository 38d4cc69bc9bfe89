//! # Resocket
//!
//! A reconnecting WebSocket client that owns one logical connection to one
//! endpoint and reports everything that happens on it through callbacks.
//!
//! ## Features
//!
//! - **Owned instances**: every [`ConnectionManager`] is an explicitly built value,
//!   there is no process-wide socket state
//! - **Type-state builder**: endpoint and message handler are required at compile time
//! - **Bounded reconnection**: fixed delay, capped attempts, decide-then-notify close handling
//! - **Local recovery**: malformed frames are logged and dropped, the connection stays up
//! - **Cancellable shutdown**: `close()` cancels any pending reconnect before it returns
//! - **Pluggable seams**: transport ([`Connector`]), decoding ([`FrameDecoder`]) and
//!   retry policy ([`ReconnectionStrategy`])

pub mod core;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use crate::core::{
    builder,
    builder::{states, ConnectionManagerBuilder},
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
    manager::{CloseNotice, ConnectionManager, FrameSender, Metrics},
};

/// Type alias for Result with ResocketError
pub type Result<T> = std::result::Result<T, traits::ResocketError>;
