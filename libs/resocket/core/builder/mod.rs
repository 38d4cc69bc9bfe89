pub mod states;

use super::config::{Callbacks, CloseCallback, ErrorCallback, ManagerConfig, MessageCallback};
use super::manager::{CloseNotice, ConnectionManager};
use crate::traits::*;
use serde::de::DeserializeOwned;
use states::*;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-state builder for [`ConnectionManager`]
///
/// The endpoint and the message handler are required; `build()` only exists
/// once both are set. Setting the handler also fixes the payload type `T`.
pub struct ConnectionManagerBuilder<E, H, T>
where
    E: EndpointState,
    H: HandlerState,
{
    _state: PhantomData<(E, H)>,
    endpoint: Option<String>,
    handler: Option<(Box<dyn FrameDecoder<T>>, MessageCallback<T>)>,
    options: Options,
}

/// Optional settings, independent of the builder state
#[derive(Default)]
struct Options {
    on_error: Option<ErrorCallback>,
    on_close: Option<CloseCallback>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    connector: Option<Arc<dyn Connector>>,
}

impl ConnectionManagerBuilder<NoEndpoint, NoHandler, ()> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: PhantomData,
            endpoint: None,
            handler: None,
            options: Options::default(),
        }
    }
}

impl Default for ConnectionManagerBuilder<NoEndpoint, NoHandler, ()> {
    fn default() -> Self {
        Self::new()
    }
}

// Endpoint setting
impl<H, T> ConnectionManagerBuilder<NoEndpoint, H, T>
where
    H: HandlerState,
{
    pub fn endpoint(self, endpoint: impl Into<String>) -> ConnectionManagerBuilder<HasEndpoint, H, T> {
        ConnectionManagerBuilder {
            _state: PhantomData,
            endpoint: Some(endpoint.into()),
            handler: self.handler,
            options: self.options,
        }
    }
}

// Handler setting
impl<E> ConnectionManagerBuilder<E, NoHandler, ()>
where
    E: EndpointState,
{
    /// Decode every frame as JSON into `T` and hand it to `on_message`
    pub fn on_message<T, F>(self, on_message: F) -> ConnectionManagerBuilder<E, HasHandler, T>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        self.on_decoded(JsonDecoder::<T>::new(), on_message)
    }

    /// Decode every frame with `decoder` and hand the result to `on_message`
    pub fn on_decoded<T, D, F>(
        self,
        decoder: D,
        on_message: F,
    ) -> ConnectionManagerBuilder<E, HasHandler, T>
    where
        T: Send + 'static,
        D: FrameDecoder<T>,
        F: FnMut(T) + Send + 'static,
    {
        let decoder: Box<dyn FrameDecoder<T>> = Box::new(decoder);
        let on_message: MessageCallback<T> = Box::new(on_message);
        ConnectionManagerBuilder {
            _state: PhantomData,
            endpoint: self.endpoint,
            handler: Some((decoder, on_message)),
            options: self.options,
        }
    }
}

// Optional configuration methods
impl<E, H, T> ConnectionManagerBuilder<E, H, T>
where
    E: EndpointState,
    H: HandlerState,
{
    /// Called with the detail of every transport error
    ///
    /// Errors never close the connection by themselves; a failed attempt is
    /// reported here and then as a close.
    pub fn on_error(mut self, on_error: impl FnMut(ResocketError) + Send + 'static) -> Self {
        self.options.on_error = Some(Box::new(on_error));
        self
    }

    /// Called after every disconnection, once the retry decision is made
    pub fn on_close(mut self, on_close: impl FnMut(CloseNotice) + Send + 'static) -> Self {
        self.options.on_close = Some(Box::new(on_close));
        self
    }

    /// Replace the default policy (10s fixed delay, at most 5 attempts)
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.options.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Replace the default tokio-tungstenite transport
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.options.connector = Some(Arc::new(connector));
        self
    }

    /// Share a transport between several managers
    pub fn shared_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.options.connector = Some(connector);
        self
    }
}

// Build method - only available when all required fields are set
impl<T> ConnectionManagerBuilder<HasEndpoint, HasHandler, T>
where
    T: Send + 'static,
{
    /// Build the manager and start connecting
    ///
    /// # Errors
    /// * `Configuration` - the endpoint is not a ws:// or wss:// URL, or no
    ///   tokio runtime is running
    pub fn build(self) -> Result<ConnectionManager> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| ResocketError::Configuration("endpoint must be set".into()))?;
        validate_endpoint(&endpoint)?;

        let (decoder, on_message) = self
            .handler
            .ok_or_else(|| ResocketError::Configuration("message handler must be set".into()))?;

        let Options {
            on_error,
            on_close,
            reconnect_strategy,
            connector,
        } = self.options;

        let config = ManagerConfig {
            endpoint,
            connector: connector.unwrap_or_else(|| Arc::new(TungsteniteConnector)),
            decoder,
            reconnect_strategy: reconnect_strategy
                .unwrap_or_else(|| Box::new(FixedDelay::default())),
            callbacks: Callbacks {
                on_message,
                on_error,
                on_close,
            },
        };

        ConnectionManager::spawn(config)
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let rest = endpoint
        .strip_prefix("ws://")
        .or_else(|| endpoint.strip_prefix("wss://"))
        .ok_or_else(|| {
            ResocketError::Configuration(format!("endpoint must be a ws:// or wss:// URL: {}", endpoint))
        })?;

    if rest.is_empty() || rest.starts_with('/') {
        return Err(ResocketError::Configuration(format!(
            "endpoint has no host: {}",
            endpoint
        )));
    }
    Ok(())
}
