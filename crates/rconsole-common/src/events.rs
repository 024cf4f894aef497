//! Event names and payloads exchanged between consoles, the relay and agents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Local event raised when the session is established. Never sent on the wire.
pub const CONNECT: &str = "connect";
/// Relay → console: one line of remote output.
pub const OUTPUT: &str = "output";
/// Console → relay: a command typed by the user.
pub const COMMAND_FROM_WEB: &str = "command_from_web";
/// Agent → relay: output produced by a command.
pub const OUTPUT_FROM_CLIENT: &str = "output_from_client";
/// Relay → agent: a command to run.
pub const EXECUTE_COMMAND: &str = "execute_command";

/// Payload of an `output` / `output_from_client` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEvent {
    #[serde(default)]
    pub output: String,
}

impl OutputEvent {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// Lenient extraction from an untyped payload.
    ///
    /// A missing field, `null`, or a payload that is not an object yields an
    /// empty line. Non-string values render as their JSON text.
    pub fn from_value(value: &Value) -> Self {
        let output = match value.get("output") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self { output }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "output": self.output })
    }
}

/// Payload of a `command_from_web` / `execute_command` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(default)]
    pub command: String,
}

impl CommandMessage {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Extract the command string, `None` when the field is absent or not a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .get("command")
            .and_then(Value::as_str)
            .map(Self::new)
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "command": self.command })
    }
}
