mod cli;
mod console;

use rconsole_bridge::{ConsoleBridge, StdoutSurface, TextInput};
use rconsole_common::ConsoleError;
use rconsole_config::RconsoleConfig;
use rconsole_socket::{SocketClient, SocketConfig};
use tokio::io::BufReader;

use crate::console::Exit;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let loaded = rconsole_config::load_config(args.config.as_deref());
    let level = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "info".into());
    let directives = format!("rconsole={level},rconsole_bridge={level},rconsole_socket={level}");
    // Logs go to stderr so they never interleave with console output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
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

    tracing::info!("rconsole v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args, config).await {
        tracing::error!(error = %e, "rconsole failed");
        std::process::exit(1);
    }
}

async fn run(args: cli::Args, config: RconsoleConfig) -> Result<(), ConsoleError> {
    let url = args.server_url.unwrap_or_else(|| config.server.url.clone());
    let (client, mut events) =
        SocketClient::connect(SocketConfig::from_config(url, &config.client))?;

    let mut bridge = ConsoleBridge::new(
        client,
        StdoutSurface::new(std::io::stdout()),
        TextInput::new(),
    );
    let stdin = BufReader::new(tokio::io::stdin());

    match console::drive(&mut bridge, &mut events, stdin).await {
        Exit::InputClosed => tracing::debug!("Input closed"),
        Exit::ConnectionClosed => tracing::warn!("Connection task ended"),
    }

    bridge.session().disconnect().await;
    Ok(())
}
