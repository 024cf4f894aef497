pub mod errors;
pub mod events;
pub mod id;

pub use errors::{ConfigError, ConsoleError, PacketError, SocketError};
pub use events::{CommandMessage, OutputEvent};
pub use id::{new_id, SocketId};
