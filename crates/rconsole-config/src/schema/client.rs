use serde::{Deserialize, Serialize};

/// Where the console and the agent connect to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the relay (`http`, `https`, `ws` or `wss`).
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5001".into(),
        }
    }
}

/// Socket client connection behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub connect_timeout_secs: u64,
    /// Initial reconnect delay, doubled after every failed attempt.
    pub reconnect_delay_secs: u64,
    pub max_reconnect_delay_secs: u64,
    /// Capacity of the event channel handed to the application.
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
            event_buffer: 256,
        }
    }
}
