//! Error types for the event bus

use thiserror::Error;

/// Event bus error
#[derive(Debug, Error)]
pub enum Error {
    /// Handler rejected an event
    #[error("Handler error: {0}")]
    Handler(String),

    /// Receiving side of a channel subscriber is gone
    #[error("Channel closed")]
    ChannelClosed,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Handler(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Handler(msg.to_string())
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
