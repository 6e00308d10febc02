//! Endpoint addressing and credentials.

use crate::error::{Result, VimError};
use reqwest::Url;
use std::fmt;
use zeroize::Zeroizing;

/// Default API path on a vCenter or ESXi host.
pub const DEFAULT_SDK_PATH: &str = "/sdk";

/// A user name and password used to log in to a vSphere endpoint.
///
/// The password is wiped from memory when the value is dropped and never
/// shows up in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Create a new set of credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// The principal name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The secret. Only read this to authenticate.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A parsed vSphere API endpoint, optionally carrying login credentials
/// and the user agent the connection should identify itself with.
#[derive(Debug, Clone)]
pub struct Endpoint {
    url: Url,
    credentials: Option<Credentials>,
    user_agent: Option<String>,
}

impl Endpoint {
    /// Parse a server address into an endpoint.
    ///
    /// Accepts a bare host (`vc.local`), a host and port, or a full URL.
    /// The scheme defaults to `https` and an empty path to `/sdk`.
    /// Any user info embedded in the address is discarded; attach
    /// credentials with [`with_credentials`](Self::with_credentials).
    ///
    /// Returns `Ok(None)` for an empty address.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let candidate = if has_scheme(raw) {
            raw.to_string()
        } else {
            format!("https://{raw}")
        };

        let invalid = |reason: String| VimError::InvalidUrl {
            url: raw.to_string(),
            reason,
        };

        let mut url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".into()));
        }
        if url.path().is_empty() || url.path() == "/" {
            url.set_path(DEFAULT_SDK_PATH);
        }

        // Neither call can fail on an http(s) URL with a host.
        let _ = url.set_username("");
        let _ = url.set_password(None);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Some(Self {
            url,
            credentials: None,
            user_agent: None,
        }))
    }

    /// Attach login credentials to this endpoint.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Send `user_agent` on every request of connections to this endpoint,
    /// overriding the connector's default. An empty value is ignored.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        self.user_agent = (!user_agent.trim().is_empty()).then_some(user_agent);
        self
    }

    /// User agent override, if any.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// The normalized endpoint URL (never contains user info).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host name of the endpoint.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Credentials attached to this endpoint, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Base URL of the VI/JSON binding for the given API release,
    /// e.g. `https://vc.local/sdk/vim25/8.0.1.0/`.
    pub fn vim25_base(&self, release: &str) -> Url {
        let sdk = self.url.path().trim_end_matches('/');
        let mut base = self.url.clone();
        base.set_path(&format!("{sdk}/vim25/{release}/"));
        base
    }
}

/// True if `raw` starts with `<word>://`.
fn has_scheme(raw: &str) -> bool {
    raw.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
