//! Host and transport configuration.

use std::time::Duration;

/// Primary model host.
pub const PRIMARY_HOST: &str = "https://huggingface.co";

/// Mirror tried when the primary host fails.
pub const MIRROR_HOST: &str = "https://hf-mirror.com";

/// Configuration for talking to model hosts.
///
/// # Example
///
/// ```
/// use lmbridge_hf::HostConfig;
/// use std::time::Duration;
///
/// let config = HostConfig::new()
///     .with_hosts(["https://hf-mirror.com"])
///     .with_connect_timeout(Duration::from_secs(5));
/// assert_eq!(config.hosts().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Hosts in the order they are tried.
    pub(crate) hosts: Vec<String>,
    pub(crate) user_agent: String,
    pub(crate) connect_timeout: Duration,
    /// Maximum idle time between reads of one response.
    pub(crate) read_timeout: Duration,
    /// Pause between consecutive index requests.
    pub(crate) index_delay: Duration,
    pub(crate) max_retries: u8,
    pub(crate) retry_base_delay: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            hosts: vec![PRIMARY_HOST.to_string(), MIRROR_HOST.to_string()],
            user_agent: concat!("lmbridge/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
            index_delay: Duration::from_millis(50),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl HostConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the host list. Trailing slashes are trimmed.
    #[must_use]
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts
            .into_iter()
            .map(|h| h.into().trim_end_matches('/').to_string())
            .collect();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Defaults to 10 seconds.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Defaults to 60 seconds.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Defaults to 50ms.
    #[must_use]
    pub const fn with_index_delay(mut self, delay: Duration) -> Self {
        self.index_delay = delay;
        self
    }

    /// Retries per request for 5xx and connection errors. Defaults to none,
    /// since a failing host is normally handled by falling back to the next.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    #[must_use]
    pub const fn index_delay(&self) -> Duration {
        self.index_delay
    }
}
