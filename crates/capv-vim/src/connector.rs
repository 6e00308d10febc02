//! Capability traits for opening and using authenticated connections.
//!
//! The session layer only ever talks to these traits, so it can be driven
//! by [`VimConnector`] in production and by an in-memory fake in tests.

use crate::client::VimClient;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::types::{Datacenter, ManagedObjectReference};
use async_trait::async_trait;
use std::time::Duration;

/// Default user agent sent with every API request.
pub const DEFAULT_USER_AGENT: &str = "infrastructure.cluster.x-k8s.io/v1alpha3";

/// Default vim25 API release used for the JSON binding.
pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";

/// Opens authenticated connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Authenticate against `endpoint` using its attached credentials.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Connection>>;
}

/// An authenticated connection to one endpoint.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Liveness probe: does the server still consider this session authenticated?
    async fn is_active(&self) -> Result<bool>;

    /// Resolve a datacenter by name; an empty name selects the server default.
    async fn datacenter_or_default(&self, name: &str) -> Result<Datacenter>;

    /// Find a virtual machine by UUID, optionally scoped to a datacenter.
    ///
    /// `instance_uuid` selects the instance UUID instead of the BIOS UUID.
    async fn find_by_uuid(
        &self,
        datacenter: Option<&ManagedObjectReference>,
        uuid: &str,
        instance_uuid: bool,
    ) -> Result<Option<ManagedObjectReference>>;
}

/// Configuration for [`VimConnector`].
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Skip TLS certificate verification (default: true).
    pub insecure: bool,
    /// Timeout for each HTTP request (default: 30s).
    pub request_timeout: Duration,
    /// vim25 release of the JSON binding (default: 8.0.1.0).
    pub api_release: String,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            insecure: true,
            request_timeout: Duration::from_secs(30),
            api_release: DEFAULT_API_RELEASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// [`Connector`] backed by the vSphere VI/JSON API.
///
/// One underlying HTTP client is shared by every connection this connector
/// opens; sessions are kept apart by their per-login token.
pub struct VimConnector {
    http: reqwest::Client,
    config: ConnectorConfig,
}

impl VimConnector {
    /// Create a connector.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client (TLS backend) cannot be initialized.
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        if config.insecure {
            tracing::warn!("TLS certificate verification is disabled for vSphere connections");
        }
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    /// Get the connector configuration.
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for VimConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Connection>> {
        let client =
            VimClient::login(self.http.clone(), endpoint, &self.config.api_release).await?;
        Ok(Box::new(client))
    }
}

#[async_trait]
impl Connection for VimClient {
    async fn is_active(&self) -> Result<bool> {
        self.session_is_active().await
    }

    async fn datacenter_or_default(&self, name: &str) -> Result<Datacenter> {
        VimClient::datacenter_or_default(self, name).await
    }

    async fn find_by_uuid(
        &self,
        datacenter: Option<&ManagedObjectReference>,
        uuid: &str,
        instance_uuid: bool,
    ) -> Result<Option<ManagedObjectReference>> {
        VimClient::find_by_uuid(self, datacenter, uuid, instance_uuid).await
    }
}
