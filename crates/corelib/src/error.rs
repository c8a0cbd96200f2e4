//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Ownership was requested from a ring with no nodes.
    #[error("hash ring is empty")]
    EmptyRing,

    #[error("node {0} is already on the ring")]
    DuplicateNode(String),

    /// Two distinct addresses hashed to the same position.
    #[error("node {new} collides with {existing} at position {position}")]
    PositionCollision {
        new: String,
        existing: String,
        position: String,
    },

    #[error("node {0} is not on the ring")]
    UnknownNode(String),

    #[error("invalid node address: {0}")]
    InvalidNode(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}
