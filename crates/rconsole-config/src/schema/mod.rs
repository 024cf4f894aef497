//! Configuration schema types for rconsole.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod agent;
mod client;
mod logging;
mod relay;

pub use agent::*;
pub use client::*;
pub use logging::*;
pub use relay::*;

use serde::{Deserialize, Serialize};

/// Root configuration shared by the console, relay and agent binaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RconsoleConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub relay: RelayConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}
