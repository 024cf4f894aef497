//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use rconsole_common::ConfigError;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let err = load_from_path(Path::new("/tmp/nonexistent_rconsole_config.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
url = "https://tunnel.example.dev"

[agent]
command_timeout_secs = 5
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.url, "https://tunnel.example.dev");
    assert_eq!(config.agent.command_timeout_secs, 5);
    // Defaults preserved
    assert_eq!(config.relay.port, 5001);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn load_does_not_validate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[relay]\nport = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.relay.port, 0);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rconsole").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.url, "http://localhost:5001");
    assert_eq!(config.relay.ping_interval_ms, 25_000);
}

#[test]
fn config_path_env_override() {
    std::env::remove_var(CONFIG_ENV);
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("rconsole/config.toml"));
    }

    std::env::set_var(CONFIG_ENV, "/srv/rconsole/relay.toml");
    assert_eq!(
        default_config_path().unwrap(),
        Path::new("/srv/rconsole/relay.toml")
    );
    std::env::remove_var(CONFIG_ENV);
}

#[test]
fn create_default_config_makes_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("c.toml");
    create_default_config(&path).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("[relay]"));
}
