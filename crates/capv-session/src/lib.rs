//! # capv-session
//!
//! Cached, liveness-checked vSphere sessions for Cluster API controllers.
//!
//! Reconcilers talk to vCenter many times a minute. Logging in on every
//! call is slow and exhausts server-side session limits, so this crate
//! keeps one authenticated session per (server, user, datacenter) and
//! re-validates it before handing it out again.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      capv-session                        │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────┐     ┌──────────────────────────┐   │
//! │  │  SessionCache   │────▶│  Mutex<HashMap<          │   │
//! │  │   - acquire()   │     │    SessionKey,           │   │
//! │  │   - stats()     │     │    Arc<Session>>>        │   │
//! │  └─────────────────┘     └──────────────────────────┘   │
//! │           │                                              │
//! │           ▼                                              │
//! │  ┌──────────────────────────┐                           │
//! │  │  Session                 │                           │
//! │  │  - find_by_instance_uuid │                           │
//! │  │  - find_by_uuid          │                           │
//! │  └──────────────────────────┘                           │
//! │           │                                              │
//! └───────────┼──────────────────────────────────────────────┘
//!             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │           capv-vim (Connector / Connection)              │
//! │            vSphere Web Services over HTTPS               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use capv_session::{CacheConfig, CallContext, EndpointSpec, SessionCache};
//! use capv_vim::{ConnectorConfig, Credentials, VimConnector};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = Arc::new(VimConnector::new(ConnectorConfig::default())?);
//! let cache = SessionCache::new(connector, CacheConfig::default());
//!
//! let credentials = Credentials::new("administrator@vsphere.local", "secret");
//! let endpoint = EndpointSpec::new("vc.local", "dc1");
//!
//! let session = cache
//!     .acquire(&CallContext::background(), &credentials, &endpoint)
//!     .await?;
//!
//! match session.find_by_instance_uuid("5012c3a4-aaaa-bbbb-cccc-0123456789ab").await? {
//!     Some(vm) => println!("found {vm}"),
//!     None => println!("not found"),
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod context;
mod error;
mod key;
mod session;

pub use cache::{CacheStats, SessionCache};
pub use config::{CacheConfig, CacheConfigBuilder};
pub use context::CallContext;
pub use error::{Result, SessionError};
pub use key::{EndpointSpec, SessionKey};
pub use session::Session;

pub use capv_vim::{Credentials, Datacenter, ManagedObjectReference};
