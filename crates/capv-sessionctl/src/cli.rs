//! Command line interface.

use crate::config::SessionctlConfig;
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Acquire a cached vSphere session and look up virtual machines.
///
/// Connection settings come from `CAPV_*` environment variables; flags
/// given here take precedence.
#[derive(Debug, Parser)]
#[command(name = "capv-sessionctl", version, about)]
pub struct Cli {
    /// vCenter address
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Login principal
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Datacenter name (empty for the server default)
    #[arg(short, long, global = true)]
    pub datacenter: Option<String>,

    /// Verify TLS certificates
    #[arg(long, global = true)]
    pub secure: bool,

    /// Deadline in seconds for acquiring the session
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and print a summary of the session
    Check,

    /// Find a virtual machine by BIOS UUID
    FindByUuid {
        /// BIOS UUID of the virtual machine
        uuid: String,
    },

    /// Find a virtual machine by instance UUID
    FindByInstanceUuid {
        /// Instance UUID of the virtual machine
        uuid: String,
    },
}

impl Cli {
    /// Layer flags over `config`.
    pub fn apply(&self, config: &mut SessionctlConfig) {
        if let Some(server) = &self.server {
            config.server = server.clone();
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(datacenter) = &self.datacenter {
            config.datacenter = datacenter.clone();
        }
        if self.secure {
            config.insecure = false;
        }
    }

    /// Acquire deadline.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
