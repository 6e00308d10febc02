//! HTTP client for the vSphere VI/JSON API.
//!
//! This speaks the JSON binding of the vim25 API served under
//! `/sdk/vim25/{release}/`. Every method call is a `POST` to
//! `{type}/{moId}/{method}` and every property read a `GET` to
//! `{type}/{moId}/{property}`. The session is carried in the
//! `vmware-api-session-id` header returned by `Login`.

use crate::endpoint::Endpoint;
use crate::error::{Result, VimError};
use crate::types::{Datacenter, FaultBody, ManagedObjectReference, ServiceContent, UserSession};
use reqwest::header::USER_AGENT;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Instant;

/// Header carrying the session token.
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// An authenticated connection to one vSphere endpoint.
pub struct VimClient {
    http: reqwest::Client,
    base: Url,
    content: ServiceContent,
    token: String,
    user_session: UserSession,
    user_agent: Option<String>,
}

impl VimClient {
    /// Log in to the endpoint with the credentials attached to it.
    ///
    /// This will:
    /// 1. Retrieve the service content (to find the session manager)
    /// 2. Call `SessionManager.Login`
    /// 3. Keep the session token and user session for later calls
    ///
    /// # Errors
    ///
    /// Returns [`VimError::InvalidLogin`] if the server rejects the
    /// credentials and [`VimError::NotAuthenticated`] if none are attached.
    pub async fn login(http: reqwest::Client, endpoint: &Endpoint, release: &str) -> Result<Self> {
        let start = Instant::now();
        let credentials = endpoint.credentials().ok_or(VimError::NotAuthenticated)?;
        let base = endpoint.vim25_base(release);
        let user_agent = endpoint.user_agent();
        tracing::debug!(url = %base, user = %credentials.username(), "Logging in to vSphere");

        let content_url = join(&base, &["ServiceInstance", "ServiceInstance", "content"])?;
        let response = check(tag(http.get(content_url), user_agent).send().await?).await?;
        let content: ServiceContent = response.json().await?;
        if let Some(about) = &content.about {
            tracing::debug!(
                product = %about.full_name,
                api_version = %about.api_version,
                "Retrieved service content"
            );
        }

        let login_url = join(
            &base,
            &[
                content.session_manager.kind.as_str(),
                content.session_manager.value.as_str(),
                "Login",
            ],
        )?;
        let response = tag(http.post(login_url), user_agent)
            .json(&serde_json::json!({
                "userName": credentials.username(),
                "password": credentials.password(),
            }))
            .send()
            .await?;
        let response = check(response).await?;

        let token = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                VimError::UnexpectedResponse(format!("login response without {SESSION_HEADER}"))
            })?;
        let user_session: UserSession = response.json().await?;

        tracing::info!(
            url = %base,
            user = %user_session.user_name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Logged in to vSphere"
        );

        Ok(Self {
            http,
            base,
            content,
            token,
            user_session,
            user_agent: user_agent.map(str::to_string),
        })
    }

    /// Service content retrieved at login.
    pub fn content(&self) -> &ServiceContent {
        &self.content
    }

    /// The server-side session this client is bound to.
    pub fn user_session(&self) -> &UserSession {
        &self.user_session
    }

    /// Ask the server whether this client's session is still authenticated.
    pub async fn session_is_active(&self) -> Result<bool> {
        let active: Option<bool> = self
            .invoke(
                &self.content.session_manager,
                "SessionIsActive",
                serde_json::json!({
                    "sessionID": self.user_session.key,
                    "userName": self.user_session.user_name,
                }),
            )
            .await?;
        Ok(active.unwrap_or(false))
    }

    /// Resolve a datacenter by name, or the only datacenter if `name` is empty.
    ///
    /// # Errors
    ///
    /// [`VimError::DatacenterNotFound`] if nothing matches and
    /// [`VimError::MultipleDatacenters`] if no name was given but the
    /// inventory has more than one datacenter.
    pub async fn datacenter_or_default(&self, name: &str) -> Result<Datacenter> {
        if name.is_empty() {
            return self.default_datacenter().await;
        }

        let path = name.trim_start_matches('/');
        let found: Option<ManagedObjectReference> = self
            .invoke(
                &self.content.search_index,
                "FindByInventoryPath",
                serde_json::json!({ "inventoryPath": path }),
            )
            .await?;

        match found {
            Some(reference) if reference.kind == "Datacenter" => {
                tracing::debug!(datacenter = %path, reference = %reference, "Resolved datacenter");
                Ok(Datacenter::new(reference, path))
            }
            Some(other) => {
                tracing::debug!(path = %path, found = %other, "Inventory path is not a datacenter");
                Err(VimError::DatacenterNotFound(name.to_string()))
            }
            None => Err(VimError::DatacenterNotFound(name.to_string())),
        }
    }

    async fn default_datacenter(&self) -> Result<Datacenter> {
        let children: Vec<ManagedObjectReference> = self
            .property(&self.content.root_folder, "childEntity")
            .await?;

        let mut datacenters = children.into_iter().filter(|c| c.kind == "Datacenter");
        match (datacenters.next(), datacenters.next()) {
            (Some(only), None) => {
                tracing::debug!(reference = %only, "Resolved default datacenter");
                Ok(Datacenter::new(only, ""))
            }
            (None, _) => Err(VimError::DatacenterNotFound("*".into())),
            (Some(_), Some(_)) => Err(VimError::MultipleDatacenters),
        }
    }

    /// `SearchIndex.FindByUuid` restricted to virtual machines.
    ///
    /// `instance_uuid` selects between the vCenter instance UUID and the
    /// BIOS UUID. Returns `Ok(None)` when nothing matches.
    pub async fn find_by_uuid(
        &self,
        datacenter: Option<&ManagedObjectReference>,
        uuid: &str,
        instance_uuid: bool,
    ) -> Result<Option<ManagedObjectReference>> {
        let mut body = serde_json::json!({
            "uuid": uuid,
            "vmSearch": true,
            "instanceUuid": instance_uuid,
        });
        if let Some(dc) = datacenter {
            body["datacenter"] = serde_json::to_value(dc.to_wire())?;
        }
        self.invoke(&self.content.search_index, "FindByUuid", body)
            .await
    }

    /// Invoke a method on a managed object. An empty or `null` result is `None`.
    async fn invoke<T: DeserializeOwned>(
        &self,
        target: &ManagedObjectReference,
        method: &str,
        body: serde_json::Value,
    ) -> Result<Option<T>> {
        let url = join(&self.base, &[target.kind.as_str(), target.value.as_str(), method])?;
        tracing::trace!(method = %method, target = %target, body = %body, "Invoking vSphere method");

        let response = tag(self.http.post(url), self.user_agent.as_deref())
            .header(SESSION_HEADER, &self.token)
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let text = response.text().await?;
        tracing::trace!(method = %method, response = %text, "vSphere method returned");
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<Option<T>>(&text)?)
    }

    /// Read a property of a managed object.
    async fn property<T: DeserializeOwned>(
        &self,
        target: &ManagedObjectReference,
        property: &str,
    ) -> Result<T> {
        let url = join(&self.base, &[target.kind.as_str(), target.value.as_str(), property])?;
        let response = tag(self.http.get(url), self.user_agent.as_deref())
            .header(SESSION_HEADER, &self.token)
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }
}

/// Override the client's default user agent when the endpoint carries one.
fn tag(request: RequestBuilder, user_agent: Option<&str>) -> RequestBuilder {
    match user_agent {
        Some(user_agent) => request.header(USER_AGENT, user_agent),
        None => request,
    }
}

/// Append path segments to the API base URL.
fn join(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| VimError::UnexpectedResponse(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn non-2xx responses into errors, decoding vSphere fault bodies.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<FaultBody>(&body) {
        Ok(fault) => {
            tracing::debug!(status = %status, fault = %fault.kind, "vSphere fault");
            Err(match fault.kind.as_str() {
                "InvalidLogin" => VimError::InvalidLogin,
                "NotAuthenticated" => VimError::NotAuthenticated,
                _ => VimError::Fault {
                    message: fault.message(),
                    kind: fault.kind,
                },
            })
        }
        Err(_) if status == StatusCode::UNAUTHORIZED => Err(VimError::NotAuthenticated),
        Err(_) => Err(VimError::UnexpectedResponse(format!(
            "status {status}: {}",
            body.trim()
        ))),
    }
}
