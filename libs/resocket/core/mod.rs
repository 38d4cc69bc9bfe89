//! # Resocket core
//!
//! The connection manager and the builder that assembles it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use resocket::{CloseNotice, FixedDelay};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> resocket::Result<()> {
//!     let manager = resocket::builder()
//!         .endpoint("ws://localhost:5020")
//!         .on_message(|fixes: Vec<serde_json::Value>| println!("{} fixes", fixes.len()))
//!         .on_error(|e| eprintln!("transport error: {}", e))
//!         .on_close(|notice: CloseNotice| eprintln!("closed, retry {}", notice.retry_count))
//!         .reconnect_strategy(FixedDelay::new(Duration::from_secs(10), Some(5)))
//!         .build()?;
//!
//!     manager.send(r#"{"zoom":10}"#);
//!     manager.close();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod connection_state;
pub mod manager;

pub(crate) mod config;
pub(crate) mod gate;

// Re-export main types
pub use builder::{states, ConnectionManagerBuilder};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
pub use manager::{CloseNotice, ConnectionManager, FrameSender, Metrics};

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new connection manager builder
pub fn builder() -> ConnectionManagerBuilder<builder::states::NoEndpoint, builder::states::NoHandler, ()> {
    ConnectionManagerBuilder::new()
}
