//! Socket registry: maps session ids to outbound frame channels.

use std::collections::HashMap;
use std::sync::Arc;

use rconsole_common::SocketId;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Thread-safe registry of sockets that completed the Socket.IO connect.
#[derive(Clone, Default)]
pub struct SocketRegistry {
    sockets: Arc<RwLock<HashMap<SocketId, mpsc::Sender<String>>>>,
}

impl SocketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, sid: SocketId, tx: mpsc::Sender<String>) {
        self.sockets.write().await.insert(sid, tx);
    }

    /// Returns true if the socket was registered.
    pub async fn unregister(&self, sid: &SocketId) -> bool {
        self.sockets.write().await.remove(sid).is_some()
    }

    /// Queue `frame` for every registered socket. Returns how many accepted it.
    ///
    /// Sockets whose channel is closed are dropped from the registry; a full
    /// queue loses this frame for that socket only.
    pub async fn broadcast(&self, frame: &str) -> usize {
        let targets: Vec<(SocketId, mpsc::Sender<String>)> = self
            .sockets
            .read()
            .await
            .iter()
            .map(|(sid, tx)| (sid.clone(), tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (sid, tx) in targets {
            match tx.try_send(frame.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(sid = %sid, "Outbound queue full, dropping frame");
                }
                Err(TrySendError::Closed(_)) => closed.push(sid),
            }
        }

        if !closed.is_empty() {
            let mut map = self.sockets.write().await;
            for sid in &closed {
                map.remove(sid);
            }
        }
        delivered
    }

    /// Number of connected sockets.
    pub async fn count(&self) -> usize {
        self.sockets.read().await.len()
    }
}
