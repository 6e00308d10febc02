//! Error types for capv-vim.

use thiserror::Error;

/// Result type alias for capv-vim operations.
pub type Result<T> = std::result::Result<T, VimError>;

/// Errors that can occur while talking to the vSphere API.
#[derive(Debug, Error)]
pub enum VimError {
    /// The endpoint URL could not be parsed
    #[error("invalid vSphere URL {url:?}: {reason}")]
    InvalidUrl {
        /// The raw URL as supplied by the caller
        url: String,
        /// Why parsing failed
        reason: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server rejected the supplied credentials
    #[error("cannot complete login due to an incorrect user name or password")]
    InvalidLogin,

    /// The request was made without a valid session
    #[error("the session is not authenticated")]
    NotAuthenticated,

    /// Any other fault reported by the server
    #[error("vSphere fault {kind}: {message}")]
    Fault {
        /// Fault type name, e.g. `ManagedObjectNotFound`
        kind: String,
        /// Human readable fault message
        message: String,
    },

    /// The server answered with something we could not interpret
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No datacenter matched the requested name
    #[error("datacenter {0:?} not found")]
    DatacenterNotFound(String),

    /// No datacenter was named and the server has more than one
    #[error("default datacenter resolves to multiple instances, please specify")]
    MultipleDatacenters,
}
