//! Reconnecting Socket.IO client.
//!
//! [`SocketClient::connect`] spawns a background task that owns the
//! WebSocket: it performs the Engine.IO / Socket.IO handshakes, answers
//! server pings, decodes events onto an mpsc channel, and reconnects with
//! exponential backoff when the connection drops.

mod client;
mod connection;
mod handler;
mod types;


pub use client::SocketClient;
pub use types::{SocketConfig, SocketEvent};
