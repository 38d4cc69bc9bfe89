use crate::traits::error::{ResocketError, Result};
use crate::traits::message::WsMessage;
use async_trait::async_trait;
use futures::{future, Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// Outbound half of an open connection
pub type FrameSink = Pin<Box<dyn Sink<WsMessage, Error = ResocketError> + Send>>;

/// Inbound half of an open connection
///
/// - `Some(Ok(frame))` - a data frame, in receive order
/// - `Some(Err(e))` - a transport error; the stream may keep going
/// - `None` - the connection is closed
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<WsMessage>> + Send>>;

/// An open connection, split into its two halves
pub struct Socket {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl Socket {
    pub fn new(sink: FrameSink, stream: FrameStream) -> Self {
        Self { sink, stream }
    }
}

/// Trait for opening transports
///
/// The manager calls `connect` once per attempt and never holds more than one
/// socket at a time.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a connection to `endpoint`
    ///
    /// # Returns
    /// * `Ok(socket)` - The handshake completed, the connection is open
    /// * `Err(ResocketError)` - The attempt failed; reported as an error
    ///   followed by a close
    async fn connect(&self, endpoint: &str) -> Result<Socket>;
}

/// Real WebSocket transport backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, endpoint: &str) -> Result<Socket> {
        let (ws_stream, response) = connect_async(endpoint)
            .await
            .map_err(|e| ResocketError::WebSocket(e.to_string()))?;
        debug!("Handshake with {} completed: {}", endpoint, response.status());

        let (write, read) = ws_stream.split();

        let sink = write
            .sink_map_err(|e| ResocketError::WebSocket(e.to_string()))
            .with(|msg: WsMessage| future::ready(Ok::<Message, ResocketError>(msg.into())));

        // A read error is surfaced once, then the stream ends; a close frame
        // ends it directly.
        let stream = read
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                let next = match item {
                    Ok(Message::Close(frame)) => {
                        debug!("Close frame received: {:?}", frame);
                        return future::ready(None);
                    }
                    Ok(msg) => WsMessage::from_tungstenite(msg).map(Ok),
                    Err(e) => {
                        *failed = true;
                        Some(Err(ResocketError::WebSocket(e.to_string())))
                    }
                };
                future::ready(Some(next))
            })
            .filter_map(future::ready);

        Ok(Socket::new(Box::pin(sink), Box::pin(stream)))
    }
}
