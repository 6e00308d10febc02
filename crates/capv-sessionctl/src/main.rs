//! capv-sessionctl entry point.
//!
//! Acquires a vSphere session through the session cache and runs one
//! lookup with it. Logs go to stderr; results go to stdout.

mod cli;
mod config;

use anyhow::Context;
use capv_session::{CacheConfig, CallContext, EndpointSpec, SessionCache};
use capv_vim::{VimConnector, DEFAULT_USER_AGENT};
use clap::Parser;
use cli::{Cli, Command};
use config::SessionctlConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("capv_sessionctl={default_level}").parse()?)
                .add_directive(format!("capv_session={default_level}").parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from environment, then apply flags
    let mut config = SessionctlConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded");

    let connector = VimConnector::new(config.connector_config())
        .context("failed to initialize vSphere HTTP client")?;
    let cache = SessionCache::new(
        Arc::new(connector),
        CacheConfig::builder()
            .user_agent(format!("{DEFAULT_USER_AGENT} capv-sessionctl/{}", env!("CARGO_PKG_VERSION")))
            .build(),
    );

    // Ctrl-C cancels the acquire
    let ctx = CallContext::background().with_timeout(cli.acquire_timeout());
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received interrupt, cancelling");
            interrupt.cancel();
        }
    });

    let endpoint = EndpointSpec::new(&config.server, &config.datacenter);
    let session = cache
        .acquire(&ctx, &config.credentials(), &endpoint)
        .await
        .with_context(|| format!("failed to acquire session for {}", config.server))?;

    match &cli.command {
        Command::Check => {
            let datacenter = session
                .datacenter()
                .map(ToString::to_string)
                .unwrap_or_default();
            println!("server:     {}", config.server);
            println!("user:       {}", config.username);
            println!("datacenter: {datacenter}");
            println!("since:      {}", session.created_at().to_rfc3339());
        }
        Command::FindByUuid { uuid } => {
            let uuid = parse_uuid(uuid)?;
            print_lookup(session.find_by_uuid(&uuid).await?);
        }
        Command::FindByInstanceUuid { uuid } => {
            let uuid = parse_uuid(uuid)?;
            print_lookup(session.find_by_instance_uuid(&uuid).await?);
        }
    }

    Ok(())
}

/// Normalize a UUID argument to lowercase hyphenated form.
fn parse_uuid(raw: &str) -> anyhow::Result<String> {
    let uuid = Uuid::parse_str(raw.trim()).with_context(|| format!("invalid UUID {raw:?}"))?;
    Ok(uuid.hyphenated().to_string())
}

fn print_lookup(found: Option<capv_session::ManagedObjectReference>) {
    match found {
        Some(reference) => println!("{reference}"),
        None => println!("not found"),
    }
}
