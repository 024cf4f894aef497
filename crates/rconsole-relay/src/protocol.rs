//! Relay-level routing. Payloads are never inspected, only re-labelled.

use rconsole_common::events::{COMMAND_FROM_WEB, EXECUTE_COMMAND, OUTPUT, OUTPUT_FROM_CLIENT};

/// Event name to broadcast for an inbound event, `None` if the relay drops it.
pub fn route(event: &str) -> Option<&'static str> {
    match event {
        OUTPUT_FROM_CLIENT => Some(OUTPUT),
        COMMAND_FROM_WEB => Some(EXECUTE_COMMAND),
        _ => None,
    }
}
