//! Event loop tying the socket and stdin to a [`ConsoleBridge`].

use rconsole_bridge::{ConsoleBridge, DisplaySurface, Key, Session, TextInput};
use rconsole_common::events::OUTPUT;
use rconsole_common::OutputEvent;
use rconsole_socket::SocketEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Why [`drive`] returned.
#[derive(Debug, PartialEq, Eq)]
pub enum Exit {
    /// Stdin reached EOF.
    InputClosed,
    /// The socket client went away.
    ConnectionClosed,
}

/// Feed socket events and input lines to `bridge` until either side ends.
///
/// Each input line becomes the input field's value followed by an Enter
/// keypress. Pending socket events are handled before the next line.
pub async fn drive<S, D, R>(
    bridge: &mut ConsoleBridge<S, D, TextInput>,
    events: &mut mpsc::Receiver<SocketEvent>,
    reader: R,
) -> Exit
where
    S: Session,
    D: DisplaySurface,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(SocketEvent::Connected) => bridge.on_connect(),
                Some(SocketEvent::Event { name, data }) if name == OUTPUT => {
                    bridge.on_output(&OutputEvent::from_value(&data));
                }
                Some(SocketEvent::Event { name, .. }) => {
                    tracing::trace!(event = %name, "Ignoring event");
                }
                Some(SocketEvent::Disconnected) => {
                    tracing::info!("Disconnected from relay");
                }
                Some(SocketEvent::Error(message)) => {
                    tracing::warn!(message = %message, "Relay connection error");
                }
                None => return Exit::ConnectionClosed,
            },

            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    bridge.input_mut().set_value(line.trim_end_matches('\r'));
                    bridge.on_keydown(&Key::Enter);
                }
                Ok(None) => return Exit::InputClosed,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read input");
                    return Exit::InputClosed;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use rconsole_bridge::{InputControl, LineBuffer};
    use rconsole_common::SocketError;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct RecordingSession {
        sent: RefCell<Vec<(String, Value)>>,
    }

    impl Session for RecordingSession {
        fn send_event(&self, event: &str, payload: Value) -> Result<(), SocketError> {
            self.sent.borrow_mut().push((event.to_string(), payload));
            Ok(())
        }
    }

    fn bridge() -> ConsoleBridge<RecordingSession, LineBuffer, TextInput> {
        ConsoleBridge::new(RecordingSession::default(), LineBuffer::new(10), TextInput::new())
    }

    #[tokio::test]
    async fn lines_become_commands() {
        let mut bridge = bridge();
        let (_tx, mut rx) = mpsc::channel(4);

        let exit = drive(&mut bridge, &mut rx, &b"ls -la\r\n\npwd\n"[..]).await;

        assert_eq!(exit, Exit::InputClosed);
        let sent = bridge.session().sent.borrow().clone();
        assert_eq!(
            sent,
            vec![
                ("command_from_web".to_string(), json!({ "command": "ls -la" })),
                ("command_from_web".to_string(), json!({ "command": "" })),
                ("command_from_web".to_string(), json!({ "command": "pwd" })),
            ]
        );
        assert_eq!(bridge.input().value(), "");
    }

    #[tokio::test]
    async fn output_events_are_rendered_in_order() {
        let mut bridge = bridge();
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(SocketEvent::Connected).await.unwrap();
        tx.send(SocketEvent::Event {
            name: "output".into(),
            data: json!({ "output": "first" }),
        })
        .await
        .unwrap();
        tx.send(SocketEvent::Event {
            name: "execute_command".into(),
            data: json!({ "command": "ignored" }),
        })
        .await
        .unwrap();
        tx.send(SocketEvent::Event {
            name: "output".into(),
            data: json!({ "output": "second" }),
        })
        .await
        .unwrap();

        let exit = drive(&mut bridge, &mut rx, &b""[..]).await;

        assert_eq!(exit, Exit::InputClosed);
        assert_eq!(bridge.surface().lines(), ["first", "second"]);
        assert!(bridge.session().sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn closed_event_channel_ends_the_loop() {
        let mut bridge = bridge();
        let (tx, mut rx) = mpsc::channel::<SocketEvent>(1);
        drop(tx);

        let (_writer, reader) = tokio::io::duplex(64);
        let reader = tokio::io::BufReader::new(reader);
        assert_eq!(drive(&mut bridge, &mut rx, reader).await, Exit::ConnectionClosed);
    }
}
