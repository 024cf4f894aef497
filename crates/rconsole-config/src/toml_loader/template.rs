//! Default TOML config template with inline documentation comments.

/// The default config file, every value commented out.
pub(crate) fn default_config_toml() -> &'static str {
    r#"# rconsole configuration
# Only override what you want to change -- missing fields use defaults.

[server]
# url = "http://localhost:5001"     # http, https, ws or wss

[client]
# connect_timeout_secs = 15         # 1-300
# reconnect_delay_secs = 1          # 1-60, doubled after each failure
# max_reconnect_delay_secs = 30
# event_buffer = 256

[relay]
# host = "0.0.0.0"
# port = 5001
# ping_interval_ms = 25000
# ping_timeout_ms = 20000
# max_payload = 1000000             # bytes per frame
# channel_capacity = 256            # queued frames per socket

[agent]
# command_timeout_secs = 30
# adb_path = "/usr/local/bin/adb"   # skips discovery

[logging]
# level = "info"                    # trace, debug, info, warn, error
"#
}
