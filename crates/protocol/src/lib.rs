//! Wire protocol for ringstore.
//!
//! This crate provides the request/response messages and the transport
//! used between the cluster and its storage nodes:
//! - Length-prefixed bincode framing
//! - A generic server loop (`Receiver`) driving a `Service`
//! - A persistent client connection (`Sender`)

pub mod codec;
pub mod error;
pub mod message;
pub mod receiver;
pub mod sender;

pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    ClusterRequest, ClusterResponse, ErrorKind, NodeEntry, RemoteError, StorageRequest,
    StorageResponse,
};
pub use receiver::{Receiver, Service};
pub use sender::Sender;
