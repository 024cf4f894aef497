//! rconsole-relay: Socket.IO relay between web consoles and command agents.
//!
//! Every connected socket receives every routed event. `command_from_web`
//! is rebroadcast as `execute_command` and `output_from_client` as `output`;
//! payloads are forwarded without inspection.

mod connection;
mod handshake;
mod protocol;
mod registry;
mod server;

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use crate::registry::SocketRegistry;
use crate::server::{serve, RelaySettings};

#[derive(Parser)]
#[command(name = "rconsole-relay", about = "Socket.IO relay for rconsole", version)]
struct Args {
    /// Address to bind (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to config file (default: platform config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let loaded = rconsole_config::load_config(args.config.as_deref());
    let level = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rconsole_relay={level}").into()),
        )
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            rconsole_config::RconsoleConfig::default()
        }
    };

    let host = args.host.unwrap_or_else(|| config.relay.host.clone());
    let port = args.port.unwrap_or(config.relay.port);
    let addr = format!("{host}:{port}");

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind TCP listener");
            std::process::exit(1);
        }
    };

    tracing::info!("rconsole-relay listening on {}", addr);

    serve(listener, RelaySettings::from(&config.relay), SocketRegistry::new()).await;
}
