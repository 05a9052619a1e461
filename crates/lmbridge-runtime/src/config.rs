//! Bridge timing configuration.

use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_STARTUP_DELAY: Duration = Duration::from_millis(20);

/// Cadence of the native engine poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Delay before each poll of a running task.
    pub poll_interval: Duration,
    /// Pause between model preparation and task submission.
    pub startup_delay: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            startup_delay: DEFAULT_STARTUP_DELAY,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BridgeConfig::new();
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.startup_delay, Duration::from_millis(20));
    }
}
