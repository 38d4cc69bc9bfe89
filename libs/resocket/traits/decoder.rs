use crate::traits::error::Result;
use crate::traits::message::WsMessage;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Trait for decoding received frames into typed payloads
///
/// Called on the connection task for every data frame, in receive order.
/// An `Err` drops the frame: it is logged and never reaches the message
/// handler, and the connection stays open.
pub trait FrameDecoder<T>: Send + Sync + 'static {
    fn decode(&self, frame: &WsMessage) -> Result<T>;
}

/// Decodes JSON frames with serde
///
/// Text and binary frames are both accepted as long as the bytes are JSON.
pub struct JsonDecoder<T> {
    _payload: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameDecoder<T> for JsonDecoder<T>
where
    T: DeserializeOwned + 'static,
{
    fn decode(&self, frame: &WsMessage) -> Result<T> {
        let value = match frame {
            WsMessage::Text(text) => serde_json::from_str(text)?,
            WsMessage::Binary(bytes) => serde_json::from_slice(bytes)?,
        };
        Ok(value)
    }
}

impl<T, F> FrameDecoder<T> for F
where
    F: Fn(&WsMessage) -> Result<T> + Send + Sync + 'static,
{
    fn decode(&self, frame: &WsMessage) -> Result<T> {
        self(frame)
    }
}
