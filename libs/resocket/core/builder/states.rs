/// Type-state markers for the builder pattern
///
/// These types track which required fields have been set on the builder at
/// compile time, so `build()` only exists once both are present.

/// Marker trait for endpoint state
pub trait EndpointState {}

/// Endpoint has not been set
pub struct NoEndpoint;
impl EndpointState for NoEndpoint {}

/// Endpoint has been set
pub struct HasEndpoint;
impl EndpointState for HasEndpoint {}

/// Marker trait for message handler state
pub trait HandlerState {}

/// Message handler has not been set
pub struct NoHandler;
impl HandlerState for NoHandler {}

/// Message handler (and with it the payload type) has been set
pub struct HasHandler;
impl HandlerState for HasHandler {}
