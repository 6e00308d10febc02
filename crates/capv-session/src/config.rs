//! Session cache configuration types.

use capv_vim::DEFAULT_USER_AGENT;
use std::time::Duration;

/// Configuration for a [`SessionCache`](crate::SessionCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// User agent sent by every connection the cache opens, also kept on
    /// the resulting session.
    pub user_agent: String,
    /// Upper bound for a single liveness probe. A probe that does not
    /// answer in time counts as inactive (default: none).
    pub probe_timeout: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            probe_timeout: None,
        }
    }
}

impl CacheConfig {
    /// Create a new config builder.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }
}

/// Builder for CacheConfig.
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Set the session user agent tag.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Bound each liveness probe.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = Some(timeout);
        self
    }

    /// Build the configuration. An empty user agent falls back to the default.
    pub fn build(mut self) -> CacheConfig {
        if self.config.user_agent.trim().is_empty() {
            self.config.user_agent = DEFAULT_USER_AGENT.to_string();
        }
        self.config
    }
}
