//! Public handle for interacting with the socket connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rconsole_common::SocketError;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::connection::connection_loop;
use super::types::{SocketCommand, SocketConfig, SocketEvent};

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle for interacting with the relay connection.
///
/// All methods are non-blocking and send commands to the background
/// connection task. Emits made while offline are queued and flushed after
/// the next successful connect.
pub struct SocketClient {
    command_tx: mpsc::Sender<SocketCommand>,
    connected: Arc<AtomicBool>,
}

impl SocketClient {
    /// Validate the URL, start the background connection, and return
    /// `(client, event_receiver)`. Must be called inside a Tokio runtime.
    pub fn connect(
        config: SocketConfig,
    ) -> Result<(Self, mpsc::Receiver<SocketEvent>), SocketError> {
        let url = config.ws_url()?;
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer.max(1));
        let (command_tx, command_rx) = mpsc::channel(64);
        let connected = Arc::new(AtomicBool::new(false));

        let client = Self {
            command_tx,
            connected: Arc::clone(&connected),
        };

        tokio::spawn(connection_loop(config, url, connected, event_tx, command_rx));

        Ok((client, event_rx))
    }

    /// Clone the command sender to create a lightweight handle
    /// that can send commands to the same connection.
    pub fn clone_sender(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            connected: Arc::clone(&self.connected),
        }
    }

    /// Emit an event, waiting for room in the command queue.
    pub async fn emit(&self, event: &str, data: Value) -> Result<(), SocketError> {
        self.command_tx
            .send(SocketCommand::Emit {
                event: event.to_string(),
                data,
            })
            .await
            .map_err(|_| SocketError::Closed)
    }

    /// Emit an event without waiting. Fails if the command queue is full.
    pub fn try_emit(&self, event: &str, data: Value) -> Result<(), SocketError> {
        self.command_tx
            .try_send(SocketCommand::Emit {
                event: event.to_string(),
                data,
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => SocketError::QueueFull,
                TrySendError::Closed(_) => SocketError::Closed,
            })
    }

    /// Check if the Socket.IO session is currently established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Disconnect from the server and stop reconnecting.
    pub async fn disconnect(&self) {
        let _ = self.command_tx.send(SocketCommand::Disconnect).await;
    }
}
