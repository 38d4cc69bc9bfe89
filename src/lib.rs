//! Vessel Map Feed - Main Library
//!
//! Headless client for a live vessel position feed.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI)
//! - **vessel_feed**: Subscription, viewport publishing and configuration
//!   (re-exported from workspace)
//! - **resocket**: Reconnecting WebSocket client (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use vessel_map_feed::bin_common::{load_config_from_env, ConfigType};
//! use vessel_map_feed::vessel_feed::FeedConfig;
//! ```

// Re-export workspace libraries for convenience
pub use resocket;
pub use vessel_feed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
}
