//! Live vessel feed
//!
//! Consumer side of the vessel position WebSocket: a subscription that keeps
//! the latest fleet snapshot, viewport requests sent back to the server, and
//! the configuration and logging around them.

pub mod domain;
pub mod infrastructure;
pub mod utils;

// Re-export commonly used items
pub use domain::{Bounds, FleetSnapshot, VesselFix, VesselFixFrame, ViewportRequest};
pub use infrastructure::{
    init_tracing, ChannelNotifier, ConfigError, FeedConfig, LogNotifier, Notifier,
    ReconnectConfig, Toast, ToastKind, VesselSubscription, ViewportConfig, ViewportPublisher,
};
pub use utils::ShutdownManager;
