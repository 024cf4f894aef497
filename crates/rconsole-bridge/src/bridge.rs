//! The console bridge itself.

use rconsole_common::events::COMMAND_FROM_WEB;
use rconsole_common::{CommandMessage, OutputEvent};
use tracing::{debug, info, warn};

use crate::input::InputControl;
use crate::key::Key;
use crate::session::Session;
use crate::surface::DisplaySurface;

/// Translates session events into display mutations, and Enter presses
/// into outbound commands.
///
/// Holds no state of its own beyond the three collaborators it is built with.
pub struct ConsoleBridge<S, D, I> {
    session: S,
    surface: D,
    input: I,
}

impl<S, D, I> ConsoleBridge<S, D, I>
where
    S: Session,
    D: DisplaySurface,
    I: InputControl,
{
    pub fn new(session: S, surface: D, input: I) -> Self {
        Self {
            session,
            surface,
            input,
        }
    }

    /// Session established. Diagnostic only.
    pub fn on_connect(&self) {
        info!("Connected to server");
    }

    /// Render one output payload as a new last line and scroll to it.
    pub fn on_output(&mut self, event: &OutputEvent) {
        debug!(output = %event.output, "Received output");
        self.surface.append_line(&event.output);
        self.surface.scroll_to_bottom();
    }

    /// Submit the input buffer on Enter; ignore every other key.
    ///
    /// Returns the submitted command, if any. The buffer is sent verbatim,
    /// empty included, and is cleared even when the send fails.
    pub fn on_keydown(&mut self, key: &Key) -> Option<CommandMessage> {
        debug!(key = ?key, "Keydown");
        if !key.is_enter() {
            return None;
        }

        let message = CommandMessage::new(self.input.value());
        debug!(command = %message.command, "Sending command");
        if let Err(e) = self
            .session
            .send_event(COMMAND_FROM_WEB, message.to_value())
        {
            warn!(error = %e, "Failed to send command");
        }
        self.input.clear();
        Some(message)
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}
