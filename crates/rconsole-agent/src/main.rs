//! rconsole-agent: executes commands relayed from the web console.
//!
//! Listens for `execute_command`, runs it locally or in an adb shell, and
//! streams the results back as `output_from_client`.

mod adb;
mod agent;
mod local;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rconsole_common::events::{EXECUTE_COMMAND, OUTPUT_FROM_CLIENT};
use rconsole_common::{CommandMessage, ConsoleError, OutputEvent};
use rconsole_config::RconsoleConfig;
use rconsole_socket::{SocketClient, SocketConfig, SocketEvent};
use tokio::sync::mpsc;

use crate::agent::Agent;

#[derive(Parser)]
#[command(name = "rconsole-agent", about = "Command agent for rconsole", version)]
struct Args {
    /// Relay URL (default: `server.url` from config).
    server_url: Option<String>,

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
    let directives = format!("rconsole_agent={level},rconsole_socket={level}");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directives.into()),
        )
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            RconsoleConfig::default()
        }
    };

    if let Err(e) = run(args, config).await {
        tracing::error!(error = %e, "Agent failed");
        std::process::exit(1);
    }
}

async fn run(args: Args, config: RconsoleConfig) -> Result<(), ConsoleError> {
    let adb_path = adb::find_adb(config.agent.adb_path.as_deref()).await;
    if adb_path.is_none() {
        tracing::warn!(
            "ADB not found; install it on PATH or place it in 'adb/' or 'platform-tools/' \
             next to the executable. Continuing in local-only mode."
        );
    }

    let url = args.server_url.unwrap_or_else(|| config.server.url.clone());
    let (client, mut events) =
        SocketClient::connect(SocketConfig::from_config(url, &config.client))?;

    let (adb_tx, mut adb_rx) = mpsc::channel::<String>(256);
    let mut agent = Agent::new(
        std::env::current_dir()?,
        adb_path,
        Duration::from_secs(config.agent.command_timeout_secs),
        adb_tx,
    )
    .with_home(dirs::home_dir());

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SocketEvent::Connected) => {
                    tracing::info!(
                        mode = %agent.mode(),
                        cwd = %agent.cwd().display(),
                        "Connected to relay"
                    );
                    send_output(&client, agent.welcome()).await;
                }
                Some(SocketEvent::Event { name, data }) if name == EXECUTE_COMMAND => {
                    let Some(message) = CommandMessage::from_value(&data) else {
                        tracing::debug!(payload = %data, "execute_command without a command");
                        continue;
                    };
                    if let Some(reply) = agent.execute(&message.command).await {
                        send_output(&client, reply).await;
                    }
                }
                Some(SocketEvent::Event { name, .. }) => {
                    tracing::trace!(event = %name, "Ignoring event");
                }
                Some(SocketEvent::Disconnected) => {
                    tracing::info!("Disconnected from relay");
                }
                Some(SocketEvent::Error(message)) => {
                    tracing::warn!(message = %message, "Relay connection error");
                }
                None => break,
            },

            Some(line) = adb_rx.recv() => {
                send_output(&client, line).await;
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    agent.shutdown().await;
    client.disconnect().await;
    Ok(())
}

async fn send_output(client: &SocketClient, text: String) {
    if let Err(e) = client
        .emit(OUTPUT_FROM_CLIENT, OutputEvent::new(text).to_value())
        .await
    {
        tracing::warn!(error = %e, "Failed to send output");
    }
}
