//! # Resocket Traits
//!
//! The seams of the connection manager:
//!
//! - **Connector**: open a transport to an endpoint
//! - **FrameDecoder**: turn a received frame into a typed payload
//! - **ReconnectionStrategy**: decide whether and when to reconnect
//!
//! ## Example
//!
//! ```rust,ignore
//! use resocket::*;
//!
//! struct UpperCase;
//!
//! impl FrameDecoder<String> for UpperCase {
//!     fn decode(&self, frame: &WsMessage) -> Result<String> {
//!         frame
//!             .as_text()
//!             .map(str::to_uppercase)
//!             .ok_or_else(|| ResocketError::Decode("binary frame".into()))
//!     }
//! }
//! ```

pub mod connector;
pub mod decoder;
pub mod error;
pub mod message;
pub mod reconnect;

// Re-export commonly used types
pub use connector::{Connector, FrameSink, FrameStream, Socket, TungsteniteConnector};
pub use decoder::{FrameDecoder, JsonDecoder};
pub use error::{ResocketError, Result};
pub use message::WsMessage;
pub use reconnect::{FixedDelay, NeverReconnect, ReconnectionStrategy};
