use protocol::{ErrorKind, ProtocolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Ring(#[from] corelib::Error),

    /// Node unreachable, connection dropped or call timed out.
    #[error("transport error talking to {node}: {source}")]
    Transport {
        node: String,
        #[source]
        source: ProtocolError,
    },

    /// The cluster service's own listener failed to bind or accept.
    #[error("listener on {addr} failed: {source}")]
    Listener {
        addr: String,
        #[source]
        source: ProtocolError,
    },

    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("node {node} rejected write of {key}")]
    WriteRejected { node: String, key: String },

    #[error("{node} failed ({kind:?}): {message}")]
    Remote {
        node: String,
        kind: ErrorKind,
        message: String,
    },

    #[error("unexpected response from {node}: {response}")]
    UnexpectedResponse { node: String, response: String },

    #[error("node {0} is already a member of the cluster")]
    AlreadyMember(String),

    #[error("node {0} is not a member of the cluster")]
    NotMember(String),

    #[error("refusing to remove {0}: it is the last node in the cluster")]
    LastNode(String),

    #[error("no connection to node {0}")]
    NoConnection(String),

    #[error("operation not supported by this backend: {0}")]
    Unsupported(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClusterError {
    pub(crate) fn transport(node: impl Into<String>, source: ProtocolError) -> Self {
        Self::Transport {
            node: node.into(),
            source,
        }
    }

    /// Wire classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Ring(corelib::Error::EmptyRing) => ErrorKind::Unavailable,
            Self::Ring(_) | Self::Config(_) => ErrorKind::InvalidArgument,
            Self::Transport { .. } | Self::NoConnection(_) => ErrorKind::Unavailable,
            Self::WriteRejected { .. } | Self::Listener { .. } | Self::Io(_) => ErrorKind::Io,
            Self::Remote { kind, .. } => *kind,
            Self::AlreadyMember(_) | Self::NotMember(_) | Self::LastNode(_) => ErrorKind::Conflict,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Storage(storage::StorageError::NotFound(_)) => ErrorKind::NotFound,
            Self::Storage(storage::StorageError::InvalidKey(_)) => ErrorKind::InvalidArgument,
            Self::Storage(_) => ErrorKind::Io,
            Self::UnexpectedResponse { .. } => ErrorKind::Internal,
        }
    }
}

pub type ClusterResult<T> = Result<T, ClusterError>;
