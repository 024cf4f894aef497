//! Per-connection handler: handshake, register, then relay events.

use std::net::SocketAddr;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rconsole_common::SocketId;
use rconsole_socket::packet::{event_frame, EnginePacket, OpenHandshake, SocketPacket};
use rconsole_socket::DEFAULT_NAMESPACE;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::protocol::route;
use crate::registry::SocketRegistry;
use crate::server::RelaySettings;

type Sink<S> = SplitSink<WebSocketStream<S>, Message>;

/// Handle a single WebSocket connection.
pub async fn handle_connection<S>(
    ws: WebSocketStream<S>,
    addr: SocketAddr,
    registry: SocketRegistry,
    settings: RelaySettings,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();
    let sid = SocketId::new();

    // 1. Engine.IO open.
    let open = EnginePacket::Open(OpenHandshake {
        sid: sid.to_string(),
        upgrades: Vec::new(),
        ping_interval: settings.ping_interval.as_millis() as u64,
        ping_timeout: settings.ping_timeout.as_millis() as u64,
        max_payload: settings.max_payload as u64,
    });
    if send_text(&mut sink, open.encode()).await.is_err() {
        return;
    }

    let (tx, mut rx) = mpsc::channel::<String>(settings.channel_capacity);
    let mut tx = Some(tx);
    let mut registered = false;

    let mut ping = tokio::time::interval_at(
        Instant::now() + settings.ping_interval,
        settings.ping_interval,
    );
    let mut pong_deadline: Option<Instant> = None;

    // 2. Relay loop.
    loop {
        let deadline = pong_deadline;
        let pong_wait = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            // Frames broadcast to this socket → its WebSocket
            Some(frame) = rx.recv() => {
                if send_text(&mut sink, frame).await.is_err() {
                    break;
                }
            }

            _ = ping.tick() => {
                if send_text(&mut sink, EnginePacket::Ping(String::new()).encode()).await.is_err() {
                    break;
                }
                if pong_deadline.is_none() {
                    pong_deadline = Some(Instant::now() + settings.ping_timeout);
                }
            }

            () = pong_wait => {
                tracing::info!(peer = %addr, sid = %sid, "Ping timeout");
                break;
            }

            // Frames from this socket → handshake or broadcast
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > settings.max_payload {
                            tracing::warn!(
                                peer = %addr,
                                size = text.len(),
                                "Frame exceeds max payload"
                            );
                            break;
                        }
                        let packet = match EnginePacket::decode(&text) {
                            Ok(packet) => packet,
                            Err(e) => {
                                tracing::debug!(peer = %addr, error = %e, "Invalid frame");
                                continue;
                            }
                        };
                        match packet {
                            EnginePacket::Pong(_) => pong_deadline = None,
                            EnginePacket::Ping(body) => {
                                let pong = EnginePacket::Pong(body).encode();
                                let _ = send_text(&mut sink, pong).await;
                            }
                            EnginePacket::Close => break,
                            EnginePacket::Message(body) => {
                                let keep_going = handle_message(
                                    &body,
                                    &sid,
                                    addr,
                                    &registry,
                                    &mut sink,
                                    &mut tx,
                                    &mut registered,
                                )
                                .await;
                                if !keep_going {
                                    break;
                                }
                            }
                            EnginePacket::Open(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 3. Cleanup.
    if registered {
        registry.unregister(&sid).await;
        tracing::info!(peer = %addr, sid = %sid, "Client disconnected");
    }
}

/// Handle one Socket.IO packet. Returns false when the socket should close.
async fn handle_message<S>(
    body: &str,
    sid: &SocketId,
    addr: SocketAddr,
    registry: &SocketRegistry,
    sink: &mut Sink<S>,
    tx: &mut Option<mpsc::Sender<String>>,
    registered: &mut bool,
) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let packet = match SocketPacket::decode(body) {
        Ok(packet) => packet,
        Err(e) => {
            tracing::debug!(peer = %addr, error = %e, "Invalid socket.io packet");
            return true;
        }
    };

    match packet {
        SocketPacket::Connect { namespace, .. } => {
            if namespace != DEFAULT_NAMESPACE {
                let refusal = SocketPacket::connect_error(&namespace, "Invalid namespace");
                return send_text(sink, refusal.to_frame()).await.is_ok();
            }
            if let Some(tx) = tx.take() {
                registry.register(sid.clone(), tx).await;
                *registered = true;
                tracing::info!(peer = %addr, sid = %sid, "Client connected");
            }
            send_text(sink, SocketPacket::connected(sid.as_str()).to_frame())
                .await
                .is_ok()
        }
        SocketPacket::Event { name, args, .. } => {
            if !*registered {
                tracing::debug!(peer = %addr, event = %name, "Event before connect, dropped");
                return true;
            }
            match route(&name) {
                Some(target) => {
                    let data = args.into_iter().next().unwrap_or(serde_json::Value::Null);
                    let delivered = registry.broadcast(&event_frame(target, data)).await;
                    tracing::debug!(from = %name, to = target, delivered, "Relayed event");
                }
                None => tracing::debug!(peer = %addr, event = %name, "Unrouted event dropped"),
            }
            true
        }
        SocketPacket::Disconnect { .. } => false,
        SocketPacket::Ack { .. } | SocketPacket::ConnectError { .. } => true,
    }
}

async fn send_text<S>(
    sink: &mut Sink<S>,
    frame: String,
) -> Result<(), tokio_tungstenite::tungstenite::Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    sink.send(Message::Text(frame.into())).await
}
