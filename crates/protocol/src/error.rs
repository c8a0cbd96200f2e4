use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("framing error: {0}")]
    Framing(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("connection to {0} closed")]
    ConnectionClosed(String),

    #[error("request to {addr} timed out after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
