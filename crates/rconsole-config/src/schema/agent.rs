use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Command agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Upper bound on a single local command.
    pub command_timeout_secs: u64,
    /// Explicit adb binary; skips discovery when set.
    pub adb_path: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
            adb_path: None,
        }
    }
}
