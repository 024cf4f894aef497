//! Incoming frame classification.

use rconsole_common::PacketError;
use serde_json::Value;

use crate::packet::{EnginePacket, OpenHandshake, SocketPacket, DEFAULT_NAMESPACE};

/// What the connection loop should do with one inbound text frame.
#[derive(Debug, PartialEq)]
pub(crate) enum Inbound {
    Open(OpenHandshake),
    Ping(String),
    Connected,
    Event { name: String, data: Value },
    ConnectError(String),
    /// Socket.IO disconnect or Engine.IO close from the server.
    Closed,
    Ignored,
}

pub(crate) fn classify(frame: &str) -> Result<Inbound, PacketError> {
    let body = match EnginePacket::decode(frame)? {
        EnginePacket::Open(handshake) => return Ok(Inbound::Open(handshake)),
        EnginePacket::Ping(body) => return Ok(Inbound::Ping(body)),
        EnginePacket::Close => return Ok(Inbound::Closed),
        EnginePacket::Message(body) => body,
        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {
            return Ok(Inbound::Ignored)
        }
    };

    let packet = SocketPacket::decode(&body)?;
    if packet.namespace() != DEFAULT_NAMESPACE {
        return Ok(Inbound::Ignored);
    }

    Ok(match packet {
        SocketPacket::Connect { .. } => Inbound::Connected,
        SocketPacket::Disconnect { .. } => Inbound::Closed,
        SocketPacket::Event { name, args, .. } => Inbound::Event {
            name,
            data: args.into_iter().next().unwrap_or(Value::Null),
        },
        SocketPacket::ConnectError { data, .. } => Inbound::ConnectError(
            data.as_ref()
                .and_then(|d| d.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("connection refused")
                .to_string(),
        ),
        SocketPacket::Ack { .. } => Inbound::Ignored,
    })
}
