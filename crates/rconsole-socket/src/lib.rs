//! Socket.IO v5 / Engine.IO v4 over WebSocket.
//!
//! [`packet`] holds the wire codec shared by the relay and the clients;
//! [`client`] is a reconnecting client with an mpsc-based handle.

pub mod client;
pub mod packet;

pub use client::{SocketClient, SocketConfig, SocketEvent};
pub use packet::{EnginePacket, OpenHandshake, SocketPacket, DEFAULT_NAMESPACE};
