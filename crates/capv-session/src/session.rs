//! Session type - an authenticated vSphere connection scoped to a datacenter.

use crate::error::{Result, SessionError};
use capv_vim::{Connection, Datacenter, ManagedObjectReference};
use chrono::{DateTime, Utc};
use std::fmt;

/// An authenticated vSphere connection bound to one datacenter.
///
/// Sessions are created by [`SessionCache`](crate::SessionCache) and handed
/// out as `Arc<Session>`. They are read-only once built: lookups go through
/// the connection but never re-authenticate. A session whose server side
/// expired fails its lookups until the next `acquire` replaces it.
///
/// `Session::default()` is a session that was never connected; every
/// lookup on it returns [`SessionError::NotInitialized`].
#[derive(Default)]
pub struct Session {
    client: Option<Box<dyn Connection>>,
    datacenter: Option<Datacenter>,
    user_agent: String,
    created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(
        client: Box<dyn Connection>,
        datacenter: Datacenter,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client: Some(client),
            datacenter: Some(datacenter),
            user_agent: user_agent.into(),
            created_at: Utc::now(),
        }
    }

    /// The datacenter this session is scoped to.
    pub fn datacenter(&self) -> Option<&Datacenter> {
        self.datacenter.as_ref()
    }

    /// The user agent the connection identifies itself with.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// When the session was established.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True if the session holds a connection.
    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    /// Find a virtual machine by its instance UUID.
    ///
    /// The instance UUID is assigned by vCenter and survives operations that
    /// regenerate the BIOS UUID, such as some clone and register flows.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no object in the datacenter has that UUID.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotInitialized`] without a connection (no network call
    /// is made) and [`SessionError::ResolutionFailed`] if the lookup fails.
    pub async fn find_by_instance_uuid(&self, uuid: &str) -> Result<Option<ManagedObjectReference>> {
        self.find(uuid, true).await
    }

    /// Find a virtual machine by its BIOS UUID.
    ///
    /// Same contract as [`find_by_instance_uuid`](Self::find_by_instance_uuid).
    pub async fn find_by_uuid(&self, uuid: &str) -> Result<Option<ManagedObjectReference>> {
        self.find(uuid, false).await
    }

    async fn find(&self, uuid: &str, instance_uuid: bool) -> Result<Option<ManagedObjectReference>> {
        let client = self.client.as_ref().ok_or(SessionError::NotInitialized)?;
        let kind = if instance_uuid { "instance uuid" } else { "uuid" };
        let datacenter = self.datacenter.as_ref().map(Datacenter::reference);

        tracing::debug!(uuid = %uuid, kind, datacenter = ?datacenter, "Finding object");
        let found = client
            .find_by_uuid(datacenter, uuid, instance_uuid)
            .await
            .map_err(|source| SessionError::ResolutionFailed {
                kind,
                uuid: uuid.to_string(),
                source,
            })?;

        match &found {
            Some(reference) => {
                tracing::debug!(uuid = %uuid, kind, reference = %reference, "Object found")
            }
            None => tracing::debug!(uuid = %uuid, kind, "No object matched"),
        }
        Ok(found)
    }

    /// Liveness probe used by the cache.
    pub(crate) async fn is_active(&self) -> capv_vim::Result<bool> {
        match &self.client {
            Some(client) => client.is_active().await,
            None => Ok(false),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("initialized", &self.is_initialized())
            .field("datacenter", &self.datacenter)
            .field("user_agent", &self.user_agent)
            .field("created_at", &self.created_at)
            .finish()
    }
}
