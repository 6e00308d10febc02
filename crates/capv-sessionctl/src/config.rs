//! Configuration for capv-sessionctl.
//!
//! Configuration is loaded from environment variables with sensible defaults,
//! then command line flags are layered on top.

use capv_vim::{ConnectorConfig, Credentials, DEFAULT_API_RELEASE};
use std::time::Duration;

/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for one capv-sessionctl run.
#[derive(Clone)]
pub struct SessionctlConfig {
    /// vCenter address (`vc.local`, `https://vc.local/sdk`, ...).
    pub server: String,

    /// Login principal.
    pub username: String,

    /// Login password.
    pub password: String,

    /// Datacenter name; empty selects the server's only datacenter.
    pub datacenter: String,

    /// Skip TLS certificate verification (default: true).
    pub insecure: bool,

    /// Per-request HTTP timeout (default: 30s).
    pub request_timeout: Duration,

    /// vim25 API release used in request paths.
    pub api_release: String,
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("vCenter server is not set (CAPV_SERVER or --server)")]
    MissingServer,

    #[error("username is not set (CAPV_USERNAME or --username)")]
    MissingUsername,

    #[error("password is not set (CAPV_PASSWORD)")]
    MissingPassword,

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("{var} must be a boolean (true/false, 1/0, yes/no, on/off), got {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Parse a boolean switch, case-insensitively.
pub fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

impl Default for SessionctlConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            username: String::new(),
            password: String::new(),
            datacenter: String::new(),
            insecure: true,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            api_release: DEFAULT_API_RELEASE.to_string(),
        }
    }
}

impl SessionctlConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CAPV_SERVER` | (required) |
    /// | `CAPV_USERNAME` | (required) |
    /// | `CAPV_PASSWORD` | (required) |
    /// | `CAPV_DATACENTER` | empty (server default) |
    /// | `CAPV_INSECURE` | `true` |
    /// | `CAPV_REQUEST_TIMEOUT_SECS` | `30` |
    /// | `CAPV_API_RELEASE` | `8.0.1.0` |
    ///
    /// Fails if `CAPV_INSECURE` is set to something that is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let insecure = match std::env::var("CAPV_INSECURE") {
            Ok(v) => parse_bool("CAPV_INSECURE", &v)?,
            Err(_) => default.insecure,
        };

        Ok(Self {
            server: std::env::var("CAPV_SERVER").unwrap_or(default.server),
            username: std::env::var("CAPV_USERNAME").unwrap_or(default.username),
            password: std::env::var("CAPV_PASSWORD").unwrap_or(default.password),
            datacenter: std::env::var("CAPV_DATACENTER").unwrap_or(default.datacenter),
            insecure,
            request_timeout: std::env::var("CAPV_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.request_timeout),
            api_release: std::env::var("CAPV_API_RELEASE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(default.api_release),
        })
    }

    /// Check that everything needed to log in is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::MissingServer);
        }

        if self.username.is_empty() {
            return Err(ConfigError::MissingUsername);
        }

        if self.password.is_empty() {
            return Err(ConfigError::MissingPassword);
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Login credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// HTTP connector settings.
    pub fn connector_config(&self) -> ConnectorConfig {
        ConnectorConfig {
            insecure: self.insecure,
            request_timeout: self.request_timeout,
            api_release: self.api_release.clone(),
            ..ConnectorConfig::default()
        }
    }
}

impl std::fmt::Debug for SessionctlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionctlConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("datacenter", &self.datacenter)
            .field("insecure", &self.insecure)
            .field("request_timeout", &self.request_timeout)
            .field("api_release", &self.api_release)
            .finish()
    }
}
