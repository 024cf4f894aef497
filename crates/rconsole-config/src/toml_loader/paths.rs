//! Where the config file lives, and writing the first-run template.

use std::path::{Path, PathBuf};

use rconsole_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "RCONSOLE_CONFIG";

const APP_DIR: &str = "rconsole";
const FILE_NAME: &str = "config.toml";

/// `$RCONSOLE_CONFIG` when set, else `<config dir>/rconsole/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }
    dirs::config_dir()
        .map(|base| base.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| ConfigError::ParseError("no platform config directory".into()))
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::ParseError(format!("{action} {}: {e}", path.display()))
}

/// Write the commented template to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| io_error("cannot create directory", parent, e))?;
    }
    std::fs::write(path, default_config_toml())
        .map_err(|e| io_error("cannot write config", path, e))?;

    info!(path = %path.display(), "Wrote default config");
    Ok(())
}
