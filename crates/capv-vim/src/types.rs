//! vim25 data objects used by this crate.
//!
//! Only the fields the session layer reads are modelled; everything else
//! in the server's JSON is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a server-side managed object, e.g. `Datacenter:datacenter-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedObjectReference {
    /// Managed object type (`Datacenter`, `VirtualMachine`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-assigned identifier (`datacenter-3`, `vm-42`, ...)
    pub value: String,
}

impl ManagedObjectReference {
    /// Create a new reference.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Wire form with the `_typeName` discriminator the JSON binding expects.
    pub(crate) fn to_wire(&self) -> WireReference<'_> {
        WireReference {
            type_name: "ManagedObjectReference",
            kind: &self.kind,
            value: &self.value,
        }
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WireReference<'a> {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

/// A resolved datacenter: the top-level scope objects are looked up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datacenter {
    reference: ManagedObjectReference,
    path: String,
}

impl Datacenter {
    /// Create a datacenter handle from its reference and inventory path.
    pub fn new(reference: ManagedObjectReference, path: impl Into<String>) -> Self {
        Self {
            reference,
            path: path.into(),
        }
    }

    /// Managed object reference of the datacenter.
    pub fn reference(&self) -> &ManagedObjectReference {
        &self.reference
    }

    /// Inventory path the datacenter was resolved from (empty for the default).
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Datacenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reference)
        } else {
            write!(f, "{} ({})", self.path, self.reference)
        }
    }
}

/// `ServiceInstance.content`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub session_manager: ManagedObjectReference,
    pub search_index: ManagedObjectReference,
    #[serde(default)]
    pub about: Option<AboutInfo>,
}

/// Product information reported by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub api_version: String,
}

/// The session returned by `SessionManager.Login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub key: String,
    pub user_name: String,
}

/// Fault body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FaultBody {
    #[serde(rename = "_typeName")]
    pub kind: String,
    #[serde(default)]
    pub fault_message: Vec<LocalizableMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocalizableMessage {
    #[serde(default)]
    pub message: Option<String>,
}

impl FaultBody {
    /// Joined human readable message, falling back to the fault type.
    pub fn message(&self) -> String {
        let parts: Vec<&str> = self
            .fault_message
            .iter()
            .filter_map(|m| m.message.as_deref())
            .collect();
        if parts.is_empty() {
            self.kind.clone()
        } else {
            parts.join("; ")
        }
    }
}
