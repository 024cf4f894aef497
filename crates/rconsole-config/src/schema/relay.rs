use serde::{Deserialize, Serialize};

/// Relay server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub ping_interval_ms: u64,
    pub ping_timeout_ms: u64,
    /// Largest accepted text frame, in bytes.
    pub max_payload: usize,
    /// Per-socket outbound queue length.
    pub channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5001,
            ping_interval_ms: 25_000,
            ping_timeout_ms: 20_000,
            max_payload: 1_000_000,
            channel_capacity: 256,
        }
    }
}
