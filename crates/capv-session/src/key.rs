//! Cache keys and endpoint descriptors.

use capv_vim::Credentials;
use std::fmt;

/// Where to connect: a server address and the datacenter to scope to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSpec {
    /// Server address, e.g. `vc.local` or `https://vc.local/sdk`.
    pub server: String,
    /// Datacenter name; empty selects the server's default datacenter.
    pub datacenter: String,
}

impl EndpointSpec {
    /// Create a new endpoint spec.
    pub fn new(server: impl Into<String>, datacenter: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            datacenter: datacenter.into(),
        }
    }

    /// The cache key for this endpoint and principal. The password is not part of it.
    pub fn key_for(&self, credentials: &Credentials) -> SessionKey {
        SessionKey::new(&self.server, credentials.username(), &self.datacenter)
    }
}

/// Identity a cached session is stored under: server, principal and datacenter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    server: String,
    username: String,
    datacenter: String,
}

impl SessionKey {
    /// Create a new key.
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        datacenter: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            username: username.into(),
            datacenter: datacenter.into(),
        }
    }

    /// Server address.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Principal name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Datacenter name (empty for the default).
    pub fn datacenter(&self) -> &str {
        &self.datacenter
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.username, self.server, self.datacenter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_password() {
        let spec = EndpointSpec::new("https://vc.local", "dc1");
        let a = spec.key_for(&Credentials::new("admin", "one"));
        let b = spec.key_for(&Credentials::new("admin", "two"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_fields_do_not_run_together() {
        // "ab" + "c" and "a" + "bc" must stay distinct keys.
        let a = SessionKey::new("vc", "ab", "c");
        let b = SessionKey::new("vc", "a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_display() {
        let key = SessionKey::new("vc.local", "admin", "dc1");
        assert_eq!(key.to_string(), "admin@vc.local/dc1");
        assert_eq!(key.server(), "vc.local");
        assert_eq!(key.username(), "admin");
        assert_eq!(key.datacenter(), "dc1");
    }
}
