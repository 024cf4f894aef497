//! Background WebSocket connection loop with auto-reconnect.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};
use url::Url;

use super::handler::{classify, Inbound};
use super::types::{SocketCommand, SocketConfig, SocketEvent};
use crate::packet::{event_frame, EnginePacket, SocketPacket, DEFAULT_NAMESPACE};

/// Frames emitted while offline are kept up to this many, oldest dropped first.
const MAX_PENDING: usize = 1024;

/// How a connected session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Connection dropped; reconnect.
    Lost,
    /// The handle asked to disconnect, or every handle was dropped.
    Shutdown,
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Background task managing the WebSocket connection with auto-reconnect.
pub(crate) async fn connection_loop(
    config: SocketConfig,
    url: Url,
    connected: Arc<AtomicBool>,
    event_tx: mpsc::Sender<SocketEvent>,
    mut command_rx: mpsc::Receiver<SocketCommand>,
) {
    let mut pending: VecDeque<String> = VecDeque::new();
    let mut reconnect_delay = config.reconnect_delay_secs.max(1);
    let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

    loop {
        info!(url = %url, "Connecting to relay");

        match tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(url.as_str()))
            .await
        {
            Ok(Ok((ws_stream, _))) => {
                reconnect_delay = config.reconnect_delay_secs.max(1);
                let end = run_session(
                    ws_stream,
                    connect_timeout,
                    &connected,
                    &event_tx,
                    &mut command_rx,
                    &mut pending,
                )
                .await;
                if end == SessionEnd::Shutdown {
                    return;
                }
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed to connect to relay");
                let _ = event_tx
                    .send(SocketEvent::Error(format!("Connection failed: {e}")))
                    .await;
            }
            Err(_elapsed) => {
                error!(
                    "WebSocket connection timed out after {}s",
                    config.connect_timeout_secs
                );
                let _ = event_tx
                    .send(SocketEvent::Error(format!(
                        "Connection timed out after {}s",
                        config.connect_timeout_secs
                    )))
                    .await;
            }
        }

        // Exponential backoff reconnect.
        info!(
            delay = reconnect_delay,
            "Reconnecting in {} seconds", reconnect_delay
        );
        let deadline = Instant::now() + Duration::from_secs(reconnect_delay);
        if wait_for_retry(deadline, &mut command_rx, &mut pending).await == SessionEnd::Shutdown {
            return;
        }
        reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay_secs.max(1));
    }
}

/// Sleep until `deadline`, queueing emits. Returns `Shutdown` if asked to stop.
async fn wait_for_retry(
    deadline: Instant,
    command_rx: &mut mpsc::Receiver<SocketCommand>,
    pending: &mut VecDeque<String>,
) -> SessionEnd {
    loop {
        tokio::select! {
            () = tokio::time::sleep_until(deadline) => return SessionEnd::Lost,
            cmd = command_rx.recv() => match cmd {
                Some(SocketCommand::Emit { event, data }) => {
                    queue_frame(pending, event_frame(&event, data));
                }
                Some(SocketCommand::Disconnect) | None => return SessionEnd::Shutdown,
            },
        }
    }
}

fn queue_frame(pending: &mut VecDeque<String>, frame: String) {
    if pending.len() >= MAX_PENDING {
        warn!(limit = MAX_PENDING, "Offline queue full, dropping oldest frame");
        pending.pop_front();
    }
    pending.push_back(frame);
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Drive one established WebSocket until it drops or shutdown is requested.
///
/// The Engine.IO open packet and the Socket.IO connect acknowledgement must
/// each arrive within `handshake_timeout`.
async fn run_session<S>(
    ws: WebSocketStream<S>,
    handshake_timeout: Duration,
    connected: &AtomicBool,
    event_tx: &mpsc::Sender<SocketEvent>,
    command_rx: &mut mpsc::Receiver<SocketCommand>,
    pending: &mut VecDeque<String>,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();
    let mut session_open = false;
    // Server pings must arrive within pingInterval + pingTimeout.
    let mut liveness: Option<Duration> = None;
    let mut ping_deadline = Some(Instant::now() + handshake_timeout);

    loop {
        let deadline = ping_deadline;
        let silence = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(SocketCommand::Emit { event, data }) => {
                    let frame = event_frame(&event, data);
                    if !session_open {
                        queue_frame(pending, frame);
                    } else if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Some(SocketCommand::Disconnect) | None => {
                    let bye = SocketPacket::Disconnect {
                        namespace: DEFAULT_NAMESPACE.to_string(),
                    };
                    let _ = sink.send(WsMessage::Text(bye.to_frame().into())).await;
                    let _ = sink.send(WsMessage::Close(None)).await;
                    connected.store(false, Ordering::SeqCst);
                    let _ = event_tx.send(SocketEvent::Disconnected).await;
                    info!("Disconnected from relay");
                    return SessionEnd::Shutdown;
                }
            },

            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => match classify(&text) {
                    Ok(Inbound::Open(handshake)) => {
                        debug!(
                            sid = %handshake.sid,
                            ping_interval = handshake.ping_interval,
                            "Engine.IO open"
                        );
                        let window = Duration::from_millis(
                            handshake.ping_interval + handshake.ping_timeout,
                        );
                        liveness = Some(window);
                        ping_deadline = Some(Instant::now() + handshake_timeout);
                        let hello = SocketPacket::connect().to_frame();
                        if sink.send(WsMessage::Text(hello.into())).await.is_err() {
                            break;
                        }
                    }
                    Ok(Inbound::Ping(body)) => {
                        if let Some(window) = liveness.filter(|_| session_open) {
                            ping_deadline = Some(Instant::now() + window);
                        }
                        let pong = EnginePacket::Pong(body).encode();
                        if sink.send(WsMessage::Text(pong.into())).await.is_err() {
                            break;
                        }
                    }
                    Ok(Inbound::Connected) => {
                        session_open = true;
                        if let Some(window) = liveness {
                            ping_deadline = Some(Instant::now() + window);
                        }
                        connected.store(true, Ordering::SeqCst);
                        info!("Connected to relay");
                        let _ = event_tx.send(SocketEvent::Connected).await;

                        let mut flushed = true;
                        while let Some(frame) = pending.pop_front() {
                            if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                                flushed = false;
                                break;
                            }
                        }
                        if !flushed {
                            break;
                        }
                    }
                    Ok(Inbound::Event { name, data }) => {
                        debug!(event = %name, "Event received");
                        let _ = event_tx.send(SocketEvent::Event { name, data }).await;
                    }
                    Ok(Inbound::ConnectError(message)) => {
                        warn!(message = %message, "Relay refused connection");
                        let _ = event_tx.send(SocketEvent::Error(message)).await;
                        break;
                    }
                    Ok(Inbound::Closed) => {
                        info!("Relay closed the session");
                        break;
                    }
                    Ok(Inbound::Ignored) => {}
                    Err(e) => {
                        debug!(error = %e, text = %text.as_str(), "Unrecognized frame from relay");
                    }
                },
                Some(Ok(WsMessage::Ping(data))) => {
                    let _ = sink.send(WsMessage::Pong(data)).await;
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Relay closed connection");
                    break;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            },

            () = silence => {
                if session_open {
                    warn!("No ping from relay within timeout");
                } else {
                    let phase = if liveness.is_none() { "open packet" } else { "connect ack" };
                    warn!(phase, "Relay handshake timed out");
                    let _ = event_tx
                        .send(SocketEvent::Error(format!(
                            "Handshake timed out after {}s waiting for {phase}",
                            handshake_timeout.as_secs()
                        )))
                        .await;
                }
                break;
            }
        }
    }

    // Cleanup.
    connected.store(false, Ordering::SeqCst);
    if session_open {
        let _ = event_tx.send(SocketEvent::Disconnected).await;
    }
    SessionEnd::Lost
}
