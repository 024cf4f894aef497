//! Engine.IO v4 / Socket.IO v5 text packet codec.
//!
//! A WebSocket text frame carries one Engine.IO packet: a single type digit
//! followed by an optional body. Engine.IO `4` (message) packets wrap a
//! Socket.IO packet: type digit, optional `/namespace,`, optional ack id,
//! optional JSON payload.
//!
//! ```text
//! 0{"sid":"…","pingInterval":25000,…}   open
//! 2 / 3                                  ping / pong
//! 40                                     socket.io connect
//! 42["output",{"output":"total 0"}]      socket.io event
//! ```
//!
//! Binary attachments (Socket.IO types 5 and 6) are rejected.

use rconsole_common::PacketError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_NAMESPACE: &str = "/";

// ---------------------------------------------------------------------------
// Engine.IO
// ---------------------------------------------------------------------------

/// Body of the Engine.IO open packet sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, PacketError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let body = chars.as_str();

        match kind {
            '0' => serde_json::from_str(body)
                .map(Self::Open)
                .map_err(|e| PacketError::InvalidPayload(format!("open handshake: {e}"))),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(body.to_string())),
            '3' => Ok(Self::Pong(body.to_string())),
            '4' => Ok(Self::Message(body.to_string())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(PacketError::UnknownEngineType(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Open(handshake) => {
                let body = serde_json::json!({
                    "sid": handshake.sid,
                    "upgrades": handshake.upgrades,
                    "pingInterval": handshake.ping_interval,
                    "pingTimeout": handshake.ping_timeout,
                    "maxPayload": handshake.max_payload,
                });
                format!("0{body}")
            }
            Self::Close => "1".to_string(),
            Self::Ping(body) => format!("2{body}"),
            Self::Pong(body) => format!("3{body}"),
            Self::Message(body) => format!("4{body}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Socket.IO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Client → server connect request on the default namespace.
    pub fn connect() -> Self {
        Self::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        }
    }

    /// Server → client connect acknowledgement.
    pub fn connected(sid: &str) -> Self {
        Self::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: Some(serde_json::json!({ "sid": sid })),
        }
    }

    pub fn connect_error(namespace: &str, message: &str) -> Self {
        Self::ConnectError {
            namespace: namespace.to_string(),
            data: Some(serde_json::json!({ "message": message })),
        }
    }

    /// A single-argument event on the default namespace.
    pub fn event(name: &str, data: Value) -> Self {
        Self::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            id: None,
            name: name.to_string(),
            args: vec![data],
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace,
        }
    }

    /// Decode the body of an Engine.IO message packet.
    pub fn decode(payload: &str) -> Result<Self, PacketError> {
        let mut chars = payload.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        match kind {
            '0'..='4' => {}
            '5' | '6' => return Err(PacketError::BinaryUnsupported),
            other => return Err(PacketError::UnknownSocketType(other)),
        }
        let mut rest = chars.as_str();

        let namespace: &str = if rest.starts_with('/') {
            match rest.find(',') {
                Some(i) => {
                    let ns = &rest[..i];
                    rest = &rest[i + 1..];
                    ns
                }
                None => std::mem::take(&mut rest),
            }
        } else {
            DEFAULT_NAMESPACE
        };
        let namespace = namespace.to_string();

        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| PacketError::InvalidPayload(format!("ack id: {e}")))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(rest)
                    .map_err(|e| PacketError::InvalidPayload(e.to_string()))?,
            )
        };

        match kind {
            '0' => Ok(Self::Connect { namespace, data }),
            '1' => Ok(Self::Disconnect { namespace }),
            '2' => {
                let Some(Value::Array(items)) = data else {
                    return Err(PacketError::InvalidPayload(
                        "event payload must be an array".into(),
                    ));
                };
                let mut items = items.into_iter();
                let Some(Value::String(name)) = items.next() else {
                    return Err(PacketError::MissingEventName);
                };
                Ok(Self::Event {
                    namespace,
                    id,
                    name,
                    args: items.collect(),
                })
            }
            '3' => {
                let id = id.ok_or_else(|| PacketError::InvalidPayload("ack without id".into()))?;
                let args = match data {
                    Some(Value::Array(items)) => items,
                    None => Vec::new(),
                    Some(_) => {
                        return Err(PacketError::InvalidPayload(
                            "ack payload must be an array".into(),
                        ))
                    }
                };
                Ok(Self::Ack {
                    namespace,
                    id,
                    args,
                })
            }
            _ => Ok(Self::ConnectError { namespace, data }),
        }
    }

    pub fn encode(&self) -> String {
        let (kind, id, data) = match self {
            Self::Connect { data, .. } => ('0', None, data.clone()),
            Self::Disconnect { .. } => ('1', None, None),
            Self::Event { id, name, args, .. } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                ('2', *id, Some(Value::Array(items)))
            }
            Self::Ack { id, args, .. } => ('3', Some(*id), Some(Value::Array(args.clone()))),
            Self::ConnectError { data, .. } => ('4', None, data.clone()),
        };

        let mut out = String::new();
        out.push(kind);
        let namespace = self.namespace();
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Encode as a complete WebSocket text frame (Engine.IO message).
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }
}

/// Shorthand for `42["<name>",<data>]`.
pub fn event_frame(name: &str, data: Value) -> String {
    SocketPacket::event(name, data).to_frame()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_open_handshake() {
        let frame = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(handshake) = EnginePacket::decode(frame).unwrap() else {
            panic!("expected open packet");
        };
        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.ping_interval, 25_000);
        assert_eq!(handshake.ping_timeout, 20_000);
        assert_eq!(handshake.max_payload, 1_000_000);
    }

    #[test]
    fn encoded_open_decodes_back() {
        let handshake = OpenHandshake {
            sid: "s1".into(),
            upgrades: vec![],
            ping_interval: 1000,
            ping_timeout: 500,
            max_payload: 4096,
        };
        let frame = EnginePacket::Open(handshake.clone()).encode();
        assert!(frame.starts_with("0{"));
        assert_eq!(EnginePacket::decode(&frame).unwrap(), EnginePacket::Open(handshake));
    }

    #[test]
    fn decode_ping_with_probe() {
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(
            EnginePacket::decode("2probe").unwrap(),
            EnginePacket::Ping("probe".into())
        );
        assert_eq!(EnginePacket::Pong("probe".into()).encode(), "3probe");
    }

    #[test]
    fn decode_engine_errors() {
        assert!(matches!(EnginePacket::decode(""), Err(PacketError::Empty)));
        assert!(matches!(
            EnginePacket::decode("9"),
            Err(PacketError::UnknownEngineType('9'))
        ));
        assert!(matches!(
            EnginePacket::decode("0{not json"),
            Err(PacketError::InvalidPayload(_))
        ));
    }

    #[test]
    fn decode_output_event() {
        let EnginePacket::Message(body) =
            EnginePacket::decode(r#"42["output",{"output":"total 0"}]"#).unwrap()
        else {
            panic!("expected message packet");
        };
        let packet = SocketPacket::decode(&body).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Event {
                namespace: "/".into(),
                id: None,
                name: "output".into(),
                args: vec![json!({ "output": "total 0" })],
            }
        );
    }

    #[test]
    fn decode_event_with_namespace_and_ack_id() {
        let packet = SocketPacket::decode(r#"2/admin,7["ping",1,2]"#).unwrap();
        let SocketPacket::Event {
            namespace,
            id,
            name,
            args,
        } = packet
        else {
            panic!("expected event");
        };
        assert_eq!(namespace, "/admin");
        assert_eq!(id, Some(7));
        assert_eq!(name, "ping");
        assert_eq!(args, vec![json!(1), json!(2)]);
    }

    #[test]
    fn decode_connect_variants() {
        assert_eq!(SocketPacket::decode("0").unwrap(), SocketPacket::connect());
        let packet = SocketPacket::decode(r#"0{"sid":"xyz"}"#).unwrap();
        assert_eq!(packet, SocketPacket::connected("xyz"));
        let packet = SocketPacket::decode("0/admin,").unwrap();
        assert_eq!(packet.namespace(), "/admin");
        let packet = SocketPacket::decode("0/admin").unwrap();
        assert_eq!(packet.namespace(), "/admin");
    }

    #[test]
    fn decode_ack() {
        let packet = SocketPacket::decode(r#"31["ok"]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Ack {
                namespace: "/".into(),
                id: 1,
                args: vec![json!("ok")],
            }
        );
        assert!(SocketPacket::decode(r#"3["ok"]"#).is_err());
    }

    #[test]
    fn decode_socket_errors() {
        assert!(matches!(SocketPacket::decode(""), Err(PacketError::Empty)));
        assert!(matches!(
            SocketPacket::decode("7"),
            Err(PacketError::UnknownSocketType('7'))
        ));
        assert!(matches!(
            SocketPacket::decode(r#"51-["file",{"_placeholder":true,"num":0}]"#),
            Err(PacketError::BinaryUnsupported)
        ));
        assert!(matches!(
            SocketPacket::decode("2[\"x\""),
            Err(PacketError::InvalidPayload(_))
        ));
        assert!(matches!(
            SocketPacket::decode("2[]"),
            Err(PacketError::MissingEventName)
        ));
        assert!(matches!(
            SocketPacket::decode("2[5]"),
            Err(PacketError::MissingEventName)
        ));
        assert!(matches!(
            SocketPacket::decode(r#"2{"a":1}"#),
            Err(PacketError::InvalidPayload(_))
        ));
    }

    #[test]
    fn encode_frames() {
        assert_eq!(SocketPacket::connect().to_frame(), "40");
        assert_eq!(SocketPacket::connected("abc").to_frame(), r#"40{"sid":"abc"}"#);
        assert_eq!(
            event_frame("command_from_web", json!({ "command": "ls -la" })),
            r#"42["command_from_web",{"command":"ls -la"}]"#
        );
        assert_eq!(
            SocketPacket::Disconnect {
                namespace: "/".into()
            }
            .to_frame(),
            "41"
        );
    }

    #[test]
    fn encode_namespaced_event_with_id() {
        let packet = SocketPacket::Event {
            namespace: "/admin".into(),
            id: Some(12),
            name: "x".into(),
            args: vec![],
        };
        assert_eq!(packet.encode(), r#"2/admin,12["x"]"#);
    }

    #[test]
    fn connect_error_carries_message() {
        let packet = SocketPacket::connect_error("/nope", "Invalid namespace");
        assert_eq!(packet.encode(), r#"4/nope,{"message":"Invalid namespace"}"#);
    }
}
