use thiserror::Error;

/// Main error type for resocket
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResocketError {
    /// WebSocket transport error (handshake, read or write)
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Frame could not be decoded into the expected payload
    #[error("Decode error: {0}")]
    Decode(String),

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for ResocketError {
    fn from(e: serde_json::Error) -> Self {
        ResocketError::Decode(e.to_string())
    }
}

/// Result type for resocket operations
pub type Result<T> = std::result::Result<T, ResocketError>;
