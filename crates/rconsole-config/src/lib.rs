//! rconsole configuration.
//!
//! A single TOML file configures the console, the relay and the agent.
//! Every section uses serde defaults so partial configs work out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    AgentConfig, ClientConfig, LoggingConfig, RconsoleConfig, RelayConfig, ServerConfig,
};

use std::path::Path;

use rconsole_common::ConfigError;

/// Load config from `path` when given, otherwise from the platform default
/// location, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<RconsoleConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[relay]\nport = 0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nurl = \"https://console.example.com\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.url, "https://console.example.com");
        assert_eq!(config.relay.port, 5001);
    }
}
