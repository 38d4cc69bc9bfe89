use crate::domain::{Bounds, ViewportRequest, MAX_ZOOM};
use resocket::FixedDelay;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides `endpoint`
pub const ENDPOINT_ENV_VAR: &str = "VESSEL_FEED_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Vessel feed configuration
///
/// Every field has a default, so an empty file (or no file) is a valid
/// configuration pointing at a local feed server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// WebSocket URL of the feed server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_secs: default_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Resend the current viewport this often, even when nothing moved
    #[serde(default = "default_publish_interval_secs")]
    pub publish_interval_secs: u64,
    /// Quiet period after a camera move before the viewport is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub initial: InitialViewport,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            publish_interval_secs: default_publish_interval_secs(),
            debounce_ms: default_debounce_ms(),
            initial: InitialViewport::default(),
        }
    }
}

/// Viewport used before the consumer reports one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialViewport {
    pub center_latitude: f64,
    pub center_longitude: f64,
    /// Height of the visible area in degrees
    pub lat_span: f64,
    /// Width of the visible area in degrees
    pub lon_span: f64,
    pub zoom: u8,
}

impl Default for InitialViewport {
    fn default() -> Self {
        // Oslofjord
        Self {
            center_latitude: 59.877_946,
            center_longitude: 10.682_710,
            lat_span: 0.25,
            lon_span: 0.5,
            zoom: 10,
        }
    }
}

fn default_endpoint() -> String {
    "ws://localhost:5020".to_string()
}

fn default_max_retries() -> usize {
    5
}

fn default_delay_secs() -> u64 {
    10
}

fn default_publish_interval_secs() -> u64 {
    2
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            reconnect: ReconnectConfig::default(),
            viewport: ViewportConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl FeedConfig {
    /// Load configuration from a YAML file
    ///
    /// A missing file yields the defaults. `VESSEL_FEED_URL` overrides the
    /// endpoint either way.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();

        let config = if config_path.exists() {
            let yaml_content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&yaml_content)?
        } else {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            FeedConfig::default()
        };

        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse and validate YAML text, without environment overrides
    pub fn from_yaml_str(yaml_content: &str) -> Result<Self> {
        let config: FeedConfig = serde_yaml::from_str(yaml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENDPOINT_ENV_VAR).filter(|url| !url.trim().is_empty()) {
            info!("Overriding endpoint from environment variable");
            self.endpoint = endpoint.trim().to_string();
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate endpoint
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(format!(
                "endpoint must be a ws:// or wss:// URL, got '{}'",
                self.endpoint
            )));
        }

        // Validate reconnect delay
        if self.reconnect.delay_secs == 0 {
            return Err(ConfigError::ValidationError(
                "reconnect.delay_secs must be greater than 0".to_string(),
            ));
        }

        // Validate publish interval
        if self.viewport.publish_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "viewport.publish_interval_secs must be greater than 0".to_string(),
            ));
        }

        let initial = &self.viewport.initial;
        if initial.zoom > MAX_ZOOM {
            return Err(ConfigError::ValidationError(format!(
                "viewport.initial.zoom must be at most {}",
                MAX_ZOOM
            )));
        }
        if initial.lat_span <= 0.0 || initial.lon_span <= 0.0 {
            return Err(ConfigError::ValidationError(
                "viewport.initial spans must be greater than 0".to_string(),
            ));
        }

        // Validate log_level
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn reconnect_strategy(&self) -> FixedDelay {
        FixedDelay::new(
            Duration::from_secs(self.reconnect.delay_secs),
            Some(self.reconnect.max_retries),
        )
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.viewport.publish_interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.viewport.debounce_ms)
    }

    pub fn initial_viewport(&self) -> ViewportRequest {
        let initial = &self.viewport.initial;
        ViewportRequest::new(
            Bounds::around(
                initial.center_latitude,
                initial.center_longitude,
                initial.lat_span,
                initial.lon_span,
            ),
            initial.zoom,
        )
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Endpoint: {}", self.endpoint);
        info!(
            "  Reconnect: every {}s, at most {} attempts",
            self.reconnect.delay_secs, self.reconnect.max_retries
        );
        info!(
            "  Viewport: every {}s, debounce {}ms",
            self.viewport.publish_interval_secs, self.viewport.debounce_ms
        );
        info!("  Log level: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_all_defaults() {
        let config = FeedConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, FeedConfig::default());
        assert_eq!(config.endpoint, "ws://localhost:5020");
        assert_eq!(config.reconnect_strategy(), FixedDelay::default());
        assert_eq!(config.publish_interval(), Duration::from_secs(2));
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert_eq!(config.initial_viewport().zoom, 10);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = FeedConfig::from_yaml_str(
            "reconnect:\n  max_retries: 2\nviewport:\n  debounce_ms: 125\n",
        )
        .unwrap();

        assert_eq!(config.reconnect.max_retries, 2);
        assert_eq!(config.reconnect.delay_secs, 10);
        assert_eq!(config.viewport.debounce_ms, 125);
        assert_eq!(config.viewport.publish_interval_secs, 2);
    }

    #[test]
    fn test_endpoint_override() {
        let config = FeedConfig::default().with_overrides(|key| {
            (key == ENDPOINT_ENV_VAR).then(|| " wss://feed.example.com/ais ".to_string())
        });
        assert_eq!(config.endpoint, "wss://feed.example.com/ais");

        let untouched = FeedConfig::default().with_overrides(|_| Some(String::new()));
        assert_eq!(untouched.endpoint, "ws://localhost:5020");
    }

    #[test]
    fn test_validation_failures() {
        for (yaml, field) in [
            ("endpoint: http://localhost:5020", "endpoint"),
            ("reconnect:\n  delay_secs: 0", "delay_secs"),
            ("viewport:\n  publish_interval_secs: 0", "publish_interval_secs"),
            ("log_level: loud", "log_level"),
        ] {
            match FeedConfig::from_yaml_str(yaml) {
                Err(ConfigError::ValidationError(msg)) => {
                    assert!(msg.contains(field), "'{}' should mention {}", msg, field)
                }
                other => panic!("expected validation error for {:?}, got {:?}", yaml, other),
            }
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let result = FeedConfig::from_yaml_str("reconnect: [1, 2");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }
}
