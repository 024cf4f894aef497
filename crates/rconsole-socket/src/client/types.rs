//! Configuration, events and commands for the socket client.

use rconsole_common::SocketError;
use rconsole_config::ClientConfig;
use serde_json::Value;
use url::Url;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Server base URL, e.g. `http://localhost:5001`.
    pub url: String,
    pub connect_timeout_secs: u64,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
    pub event_buffer: usize,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self::from_config("http://localhost:5001", &ClientConfig::default())
    }
}

impl SocketConfig {
    pub fn from_config(url: impl Into<String>, client: &ClientConfig) -> Self {
        Self {
            url: url.into(),
            connect_timeout_secs: client.connect_timeout_secs,
            reconnect_delay_secs: client.reconnect_delay_secs,
            max_reconnect_delay_secs: client.max_reconnect_delay_secs,
            event_buffer: client.event_buffer,
        }
    }

    /// Build the WebSocket endpoint: `http` becomes `ws`, `https` becomes
    /// `wss`, and the path and query select the Engine.IO v4 websocket
    /// transport.
    pub fn ws_url(&self) -> Result<Url, SocketError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| SocketError::InvalidUrl(format!("{}: {e}", self.url)))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(SocketError::InvalidUrl(format!(
                    "{}: unsupported scheme {other}",
                    self.url
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| SocketError::InvalidUrl(format!("{}: cannot use {scheme}", self.url)))?;
        url.set_path("/socket.io/");
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("EIO", "4")
            .append_pair("transport", "websocket");
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Events & Commands
// ---------------------------------------------------------------------------

/// Events emitted by the socket client.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// Socket.IO session established (server acknowledged the connect).
    Connected,
    /// Connection lost or closed.
    Disconnected,
    /// An event received from the server; `data` is its first argument.
    Event { name: String, data: Value },
    /// Connection attempt failed or the server refused the session.
    Error(String),
}

/// Commands sent to the connection task from the handle.
#[derive(Debug)]
pub(crate) enum SocketCommand {
    Emit { event: String, data: Value },
    Disconnect,
}
