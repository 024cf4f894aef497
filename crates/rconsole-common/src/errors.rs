use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures decoding an Engine.IO / Socket.IO text frame.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,

    #[error("unknown engine.io packet type: {0:?}")]
    UnknownEngineType(char),

    #[error("unknown socket.io packet type: {0:?}")]
    UnknownSocketType(char),

    #[error("invalid packet payload: {0}")]
    InvalidPayload(String),

    #[error("event packet has no name")]
    MissingEventName,

    #[error("binary packets are not supported")]
    BinaryUnsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    ConnectFailed(String),

    #[error("send queue full")]
    QueueFull,

    #[error("connection task stopped")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error(transparent)]
    Socket(#[from] SocketError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
