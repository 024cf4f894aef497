//! The outbound half of a live session, as seen by the bridge.

use rconsole_common::SocketError;
use rconsole_socket::SocketClient;
use serde_json::Value;

pub trait Session {
    /// Queue one event for delivery. Must not block.
    fn send_event(&self, event: &str, payload: Value) -> Result<(), SocketError>;
}

impl Session for SocketClient {
    fn send_event(&self, event: &str, payload: Value) -> Result<(), SocketError> {
        self.try_emit(event, payload)
    }
}
