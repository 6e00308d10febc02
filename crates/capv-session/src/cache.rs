//! Session cache for reusing authenticated vSphere connections.
//!
//! Logging in to vCenter is slow and counts against server-side session
//! limits, so sessions are cached per (server, user, datacenter) and reused
//! for as long as the server still considers them authenticated.
//!
//! # Locking
//!
//! A single async mutex covers lookup, liveness probe, login, datacenter
//! resolution and insertion. Two callers can never both miss on the same
//! key and log in twice. The price is that a slow login for one key holds up
//! `acquire` for every other key too.
//!
//! # Example
//!
//! ```ignore
//! use capv_session::{CacheConfig, CallContext, EndpointSpec, SessionCache};
//! use capv_vim::{ConnectorConfig, Credentials, VimConnector};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let connector = Arc::new(VimConnector::new(ConnectorConfig::default())?);
//! let cache = SessionCache::new(connector, CacheConfig::default());
//!
//! let ctx = CallContext::background().with_timeout(Duration::from_secs(60));
//! let credentials = Credentials::new("administrator@vsphere.local", "secret");
//! let endpoint = EndpointSpec::new("vc.local", "dc1");
//!
//! let session = cache.acquire(&ctx, &credentials, &endpoint).await?;
//! let vm = session.find_by_instance_uuid("5012c3a4-aaaa-bbbb-cccc-0123456789ab").await?;
//! ```

use crate::config::CacheConfig;
use crate::context::CallContext;
use crate::error::{Result, SessionError};
use crate::key::{EndpointSpec, SessionKey};
use crate::session::Session;
use capv_vim::{Connector, Credentials, Endpoint};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

// ============================================================================
// Statistics
// ============================================================================

/// Cache statistics for observability.
///
/// All counters are atomic and can be read without locking.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Cached sessions returned after a successful liveness probe.
    pub hits: AtomicU64,
    /// Lookups that found no session for the key.
    pub misses: AtomicU64,
    /// Cached sessions that failed the liveness probe.
    pub stale: AtomicU64,
    /// Sessions created and inserted.
    pub created: AtomicU64,
    /// `acquire` calls that returned an error.
    pub failures: AtomicU64,
}

impl CacheStats {
    /// Get the number of hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the number of misses.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the number of stale sessions detected.
    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }

    /// Get the number of sessions created.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Get the number of failed acquires.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Hits as a percentage of all lookups that reached the table.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64 + self.stale() as f64;
        if total == 0.0 {
            0.0
        } else {
            (hits / total) * 100.0
        }
    }
}

// ============================================================================
// Cache Implementation
// ============================================================================

/// Process-wide store of authenticated sessions.
///
/// Create one per process (or per test) and share it behind an `Arc`.
/// Entries are never evicted; a stale entry is replaced by the next
/// successful `acquire` for the same key.
pub struct SessionCache {
    connector: Arc<dyn Connector>,
    config: CacheConfig,
    sessions: Mutex<HashMap<SessionKey, Arc<Session>>>,
    stats: CacheStats,
}

impl SessionCache {
    /// Create an empty cache that opens connections through `connector`.
    pub fn new(connector: Arc<dyn Connector>, config: CacheConfig) -> Self {
        tracing::info!(user_agent = %config.user_agent, "Creating session cache");
        Self {
            connector,
            config,
            sessions: Mutex::new(HashMap::new()),
            stats: CacheStats::default(),
        }
    }

    /// Get a live session for `credentials` on `endpoint`, logging in if needed.
    ///
    /// This will:
    /// 1. Return the cached session for the key if its liveness probe passes
    /// 2. Otherwise parse the server address, log in, and resolve the datacenter
    /// 3. Store the new session under the key, replacing any stale one
    ///
    /// The whole sequence runs under the cache lock and is aborted if `ctx`
    /// is cancelled or its deadline passes. A failed or aborted call leaves
    /// the table exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidEndpoint`] if the server address is malformed or empty
    /// - [`SessionError::AuthenticationFailed`] if login fails
    /// - [`SessionError::DatacenterNotFound`] if the datacenter cannot be resolved
    /// - [`SessionError::Cancelled`] / [`SessionError::DeadlineExceeded`] from `ctx`
    pub async fn acquire(
        &self,
        ctx: &CallContext,
        credentials: &Credentials,
        endpoint: &EndpointSpec,
    ) -> Result<Arc<Session>> {
        let key = endpoint.key_for(credentials);
        let result = ctx
            .run(self.get_or_create(&key, credentials, endpoint))
            .await;

        if let Err(e) = &result {
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
            if e.is_context_error() {
                tracing::debug!(key = %key, error = %e, "Session acquire aborted");
            } else {
                tracing::warn!(key = %key, error = %e, "Failed to acquire vSphere session");
            }
        }
        result
    }

    async fn get_or_create(
        &self,
        key: &SessionKey,
        credentials: &Credentials,
        endpoint: &EndpointSpec,
    ) -> Result<Arc<Session>> {
        let mut sessions = self.sessions.lock().await;

        match sessions.get(key) {
            Some(session) => {
                if self.probe(key, session).await {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(
                        key = %key,
                        age_secs = (chrono::Utc::now() - session.created_at()).num_seconds(),
                        "Reusing cached vSphere client session"
                    );
                    return Ok(Arc::clone(session));
                }
                self.stats.stale.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "No cached vSphere client session");
            }
        }

        let session = Arc::new(self.create(credentials, endpoint).await?);
        sessions.insert(key.clone(), Arc::clone(&session));
        self.stats.created.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            server = %endpoint.server,
            datacenter = %endpoint.datacenter,
            "Cached vSphere client session"
        );
        Ok(session)
    }

    /// Liveness probe. Errors and timeouts count as inactive.
    async fn probe(&self, key: &SessionKey, session: &Session) -> bool {
        let outcome = match self.config.probe_timeout {
            Some(limit) => match tokio::time::timeout(limit, session.is_active()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::debug!(key = %key, timeout_ms = limit.as_millis() as u64, "Liveness probe timed out");
                    return false;
                }
            },
            None => session.is_active().await,
        };

        match outcome {
            Ok(true) => true,
            Ok(false) => {
                tracing::debug!(key = %key, "Cached session is no longer active");
                false
            }
            Err(e) => {
                // Indistinguishable from expiry here; recreate either way.
                tracing::debug!(key = %key, error = %e, "Liveness probe failed");
                false
            }
        }
    }

    /// Parse, log in, resolve the datacenter. Touches nothing in the table.
    async fn create(&self, credentials: &Credentials, endpoint: &EndpointSpec) -> Result<Session> {
        let start = Instant::now();
        let server = &endpoint.server;

        let target = Endpoint::parse(server)
            .map_err(|source| SessionError::InvalidEndpoint {
                server: server.clone(),
                source: Some(source),
            })?
            .ok_or_else(|| SessionError::InvalidEndpoint {
                server: server.clone(),
                source: None,
            })?
            .with_credentials(credentials.clone())
            .with_user_agent(&self.config.user_agent);

        tracing::debug!(url = %target.url(), user = %credentials.username(), "Opening vSphere connection");
        let client = self
            .connector
            .connect(&target)
            .await
            .map_err(|source| SessionError::AuthenticationFailed {
                server: server.clone(),
                source,
            })?;

        let datacenter = client
            .datacenter_or_default(&endpoint.datacenter)
            .await
            .map_err(|source| SessionError::DatacenterNotFound {
                datacenter: endpoint.datacenter.clone(),
                source,
            })?;

        tracing::debug!(
            server = %server,
            datacenter = %datacenter,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "vSphere session established"
        );
        Ok(Session::new(client, datacenter, &self.config.user_agent))
    }

    /// The cached session for `key`, without probing it.
    pub async fn cached(&self, key: &SessionKey) -> Option<Arc<Session>> {
        self.sessions.lock().await.get(key).cloned()
    }

    /// True if a session is stored under `key`.
    pub async fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.lock().await.contains_key(key)
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// True if no session is stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

// ============================================================================
// Tests
// ============================================================================
