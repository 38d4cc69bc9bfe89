//! Infrastructure Layer
//!
//! Everything that touches the outside world: the feed subscription and its
//! viewport publisher, configuration files, logging and toast delivery.

pub mod config;
pub mod logging;
pub mod notifications;
pub mod subscription;
pub mod viewport_publisher;

// Re-export config types
pub use config::{ConfigError, FeedConfig, InitialViewport, ReconnectConfig, ViewportConfig};

// Re-export infrastructure services
pub use logging::init_tracing;
pub use notifications::{ChannelNotifier, LogNotifier, Notifier, Toast, ToastKind};
pub use subscription::VesselSubscription;
pub use viewport_publisher::ViewportPublisher;
