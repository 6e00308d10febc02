//! # capv-vim
//!
//! vSphere API access layer for capv-session.
//! Parses endpoint addresses, carries credentials, and opens authenticated
//! connections through the VI/JSON binding of the vim25 API.
//!
//! ## Quick Start
//!
//! ```no_run
//! use capv_vim::{Connector, ConnectorConfig, Credentials, Endpoint, VimConnector};
//!
//! # async fn example() -> capv_vim::Result<()> {
//! let endpoint = Endpoint::parse("vc.local")?
//!     .expect("non-empty address")
//!     .with_credentials(Credentials::new("administrator@vsphere.local", "secret"));
//!
//! let connector = VimConnector::new(ConnectorConfig::default())?;
//! let connection = connector.connect(&endpoint).await?;
//!
//! let datacenter = connection.datacenter_or_default("dc1").await?;
//! let vm = connection
//!     .find_by_uuid(Some(datacenter.reference()), "4213a8c5-1c6e-4a4f-9e1b-5b1a2c3d4e5f", true)
//!     .await?;
//! println!("found: {:?}", vm);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Endpoint parsing**: bare hosts, host:port and full URLs, defaulting to `https://host/sdk`
//! - **Credentials**: zeroized on drop, redacted in `Debug`
//! - **Capability traits**: `Connector` and `Connection` keep callers testable without a vCenter
//! - **Datacenter finder**: named lookup or the server's only datacenter

mod client;
mod connector;
mod endpoint;
mod error;
mod types;

pub use client::{VimClient, SESSION_HEADER};
pub use connector::{
    Connection, Connector, ConnectorConfig, VimConnector, DEFAULT_API_RELEASE, DEFAULT_USER_AGENT,
};
pub use endpoint::{Credentials, Endpoint, DEFAULT_SDK_PATH};
pub use error::{Result, VimError};
pub use types::{AboutInfo, Datacenter, ManagedObjectReference, ServiceContent, UserSession};
