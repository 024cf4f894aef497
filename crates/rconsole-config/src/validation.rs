//! Full configuration validation.
//!
//! Every check runs; all failures are joined into one error.

use crate::schema::RconsoleConfig;
use rconsole_common::ConfigError;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const URL_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &RconsoleConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_url(&mut errors, "server.url", &config.server.url);

    validate_range(
        &mut errors,
        "client.connect_timeout_secs",
        config.client.connect_timeout_secs,
        1,
        300,
    );
    validate_range(
        &mut errors,
        "client.reconnect_delay_secs",
        config.client.reconnect_delay_secs,
        1,
        60,
    );
    validate_range(
        &mut errors,
        "client.max_reconnect_delay_secs",
        config.client.max_reconnect_delay_secs,
        1,
        3600,
    );
    if config.client.max_reconnect_delay_secs < config.client.reconnect_delay_secs {
        errors.push(format!(
            "client.max_reconnect_delay_secs = {} is below client.reconnect_delay_secs = {}",
            config.client.max_reconnect_delay_secs, config.client.reconnect_delay_secs
        ));
    }
    validate_range(
        &mut errors,
        "client.event_buffer",
        config.client.event_buffer as u64,
        1,
        65_536,
    );

    if config.relay.host.trim().is_empty() {
        errors.push("relay.host must not be empty".into());
    }
    validate_range(&mut errors, "relay.port", u64::from(config.relay.port), 1, 65_535);
    validate_range(
        &mut errors,
        "relay.ping_interval_ms",
        config.relay.ping_interval_ms,
        1_000,
        300_000,
    );
    validate_range(
        &mut errors,
        "relay.ping_timeout_ms",
        config.relay.ping_timeout_ms,
        1_000,
        300_000,
    );
    validate_range(
        &mut errors,
        "relay.max_payload",
        config.relay.max_payload as u64,
        1_024,
        100_000_000,
    );
    validate_range(
        &mut errors,
        "relay.channel_capacity",
        config.relay.channel_capacity as u64,
        1,
        65_536,
    );

    validate_range(
        &mut errors,
        "agent.command_timeout_secs",
        config.agent.command_timeout_secs,
        1,
        3_600,
    );

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(format!(
            "logging.level = {:?} must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_url(errors: &mut Vec<String>, name: &str, value: &str) {
    match value.split_once("://") {
        Some((scheme, rest)) if URL_SCHEMES.contains(&scheme) && !rest.is_empty() => {}
        _ => errors.push(format!(
            "{name} = {value:?} must be an absolute {} url",
            URL_SCHEMES.join("/")
        )),
    }
}
