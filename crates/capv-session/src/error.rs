//! Error types for capv-session.

use capv_vim::VimError;
use thiserror::Error;

/// Result type alias for capv-session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while acquiring or using a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The server address is malformed or empty
    #[error("error parsing vSphere URL {server:?}")]
    InvalidEndpoint {
        /// Server address as supplied by the caller
        server: String,
        /// Parse failure, `None` when the address was empty
        #[source]
        source: Option<VimError>,
    },

    /// Login to the server failed
    #[error("error setting up new vSphere client for {server:?}")]
    AuthenticationFailed {
        /// Server address
        server: String,
        /// Underlying handshake failure
        #[source]
        source: VimError,
    },

    /// The requested datacenter could not be resolved
    #[error("unable to find datacenter {datacenter:?}")]
    DatacenterNotFound {
        /// Requested datacenter name (empty for the default)
        datacenter: String,
        /// Underlying lookup failure
        #[source]
        source: VimError,
    },

    /// A lookup was attempted on a session that was never connected
    #[error("vSphere client is not initialized")]
    NotInitialized,

    /// The remote lookup failed for a reason other than "not found"
    #[error("error finding object by {kind} {uuid:?}")]
    ResolutionFailed {
        /// Which identifier was searched (`uuid` or `instance uuid`)
        kind: &'static str,
        /// The identifier
        uuid: String,
        /// Underlying API failure
        #[source]
        source: VimError,
    },

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the operation finished
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl SessionError {
    /// True for the two caller-context errors.
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
