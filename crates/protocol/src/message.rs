//! Request and response messages.
//!
//! Two surfaces share the transport: the storage surface served by every
//! storage node, and the cluster surface served by the process that owns
//! the ring (administration plus the object gateway).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Requests served by a storage node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageRequest {
    WriteFile { key: String, data: Vec<u8> },
    ReadFile { key: String },
    DeleteFile { key: String },
    ListKeys,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageResponse {
    WriteFile { success: bool },
    ReadFile { data: Vec<u8> },
    /// Deleting a missing key still reports success.
    DeleteFile { success: bool },
    ListKeys { keys: Vec<String> },
    Error(RemoteError),
}

/// Requests served by the cluster service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterRequest {
    ListNodes,
    AddNode { node_address: String },
    RemoveNode { node_address: String },
    /// Retry pulling keys into a member after a partly failed add.
    Rebalance { node_address: String },
    /// Retry pushing keys off a former member after a partly failed remove.
    DrainNode { node_address: String },
    ReadObject { object_id: String, filename: String },
    WriteObject { object_id: String, filename: String, data: Vec<u8> },
    DeleteObject { object_id: String, filename: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClusterResponse {
    /// Nodes in ascending ring position order.
    ListNodes { nodes: Vec<NodeEntry> },
    AddNode { migrated_file_count: u64, failed_file_count: u64 },
    RemoveNode { migrated_file_count: u64, failed_file_count: u64 },
    Rebalance { migrated_file_count: u64, failed_file_count: u64 },
    DrainNode { migrated_file_count: u64, failed_file_count: u64 },
    Object { data: Vec<u8> },
    Written,
    Deleted,
    Error(RemoteError),
}

/// One ring member as reported by `ListNodes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub address: String,
    pub token: u64,
    /// Fraction of the hash space owned by this node.
    pub ownership: f64,
}

/// Failure reported by the remote side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Io,
    Unavailable,
    Conflict,
    Unsupported,
    Internal,
}
