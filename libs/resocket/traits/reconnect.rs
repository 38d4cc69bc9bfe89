use std::time::Duration;

/// Default delay between reconnection attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Default cap on consecutive reconnection attempts
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Trait for defining reconnection strategies
///
/// The manager owns the retry counter; the strategy only answers whether
/// another attempt is allowed and how long to wait before it.
pub trait ReconnectionStrategy: Send + Sync {
    /// Get the delay before the next reconnection attempt
    ///
    /// # Arguments
    /// * `retry_count` - Reconnection attempts already made since the last
    ///   successful open
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long, then reconnect
    /// * `None` - Stop reconnecting
    fn next_delay(&self, retry_count: usize) -> Option<Duration>;

    /// Check if another attempt is allowed after `retry_count` attempts
    fn should_reconnect(&self, retry_count: usize) -> bool {
        self.next_delay(retry_count).is_some()
    }
}

/// Fixed delay reconnection strategy
///
/// Always waits the same amount of time between attempts, and gives up once
/// `max_retries` attempts have been made without an intervening open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
    max_retries: Option<usize>,
}

impl FixedDelay {
    /// Create a new fixed delay strategy
    ///
    /// # Arguments
    /// * `delay` - The fixed delay between reconnects
    /// * `max_retries` - Maximum number of attempts (None = unlimited)
    pub fn new(delay: Duration, max_retries: Option<usize>) -> Self {
        Self { delay, max_retries }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_retries(&self) -> Option<usize> {
        self.max_retries
    }
}

impl Default for FixedDelay {
    /// 10 seconds between attempts, at most 5 attempts
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY, Some(DEFAULT_MAX_RETRIES))
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, retry_count: usize) -> Option<Duration> {
        match self.max_retries {
            Some(max) if retry_count >= max => None,
            _ => Some(self.delay),
        }
    }
}

/// Never reconnect strategy
///
/// The first close leaves the manager inert.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _retry_count: usize) -> Option<Duration> {
        None
    }
}
