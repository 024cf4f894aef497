//! Console bridge: binds a live session to a line display and a
//! single-line input.
//!
//! Incoming `output` events become appended lines; pressing Enter sends the
//! input buffer as a `command_from_web` event and clears it.

pub mod bridge;
pub mod input;
pub mod key;
pub mod session;
pub mod surface;


pub use bridge::ConsoleBridge;
pub use input::{InputControl, TextInput};
pub use key::Key;
pub use session::Session;
pub use surface::{DisplaySurface, LineBuffer, StdoutSurface};
