//! Accept loop.

use std::time::Duration;

use rconsole_config::RelayConfig;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_hdr_async;

use crate::connection::handle_connection;
use crate::handshake::accept_request;
use crate::registry::SocketRegistry;

/// Per-connection settings derived from the `[relay]` config section.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    pub max_payload: usize,
    pub channel_capacity: usize,
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            ping_interval: Duration::from_millis(config.ping_interval_ms),
            ping_timeout: Duration::from_millis(config.ping_timeout_ms),
            max_payload: config.max_payload,
            channel_capacity: config.channel_capacity.max(1),
        }
    }
}

/// Accept connections forever, one task per socket.
pub async fn serve(listener: TcpListener, settings: RelaySettings, registry: SocketRegistry) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let registry = registry.clone();
                let settings = settings.clone();
                tokio::spawn(async move {
                    match accept_hdr_async(stream, accept_request).await {
                        Ok(ws) => handle_connection(ws, addr, registry, settings).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}
