//! Client for a remote cluster service.

use std::time::Duration;

use protocol::{ClusterRequest, ClusterResponse, ErrorKind, NodeEntry, RemoteError, Sender};

use crate::error::{ClusterError, ClusterResult};

pub struct ClusterClient {
    sender: Sender<ClusterRequest, ClusterResponse>,
}

impl ClusterClient {
    pub async fn connect(addr: &str, timeout: Option<Duration>) -> ClusterResult<Self> {
        let sender = Sender::connect(addr, timeout)
            .await
            .map_err(|e| ClusterError::transport(addr, e))?;
        Ok(Self { sender })
    }

    async fn call(&self, request: &ClusterRequest) -> ClusterResult<ClusterResponse> {
        match self.sender.call(request).await {
            Ok(ClusterResponse::Error(e)) => Err(self.remote_error(e)),
            Ok(response) => Ok(response),
            Err(e) => Err(ClusterError::transport(self.sender.addr(), e)),
        }
    }

    fn remote_error(&self, error: RemoteError) -> ClusterError {
        match error.kind {
            ErrorKind::NotFound => ClusterError::NotFound { key: error.message },
            kind => ClusterError::Remote {
                node: self.sender.addr().to_string(),
                kind,
                message: error.message,
            },
        }
    }

    fn unexpected(&self, response: ClusterResponse) -> ClusterError {
        ClusterError::UnexpectedResponse {
            node: self.sender.addr().to_string(),
            response: format!("{response:?}"),
        }
    }

    pub async fn list_nodes(&self) -> ClusterResult<Vec<NodeEntry>> {
        match self.call(&ClusterRequest::ListNodes).await? {
            ClusterResponse::ListNodes { nodes } => Ok(nodes),
            other => Err(self.unexpected(other)),
        }
    }

    /// Returns `(migrated, failed)` file counts.
    pub async fn add_node(&self, node_address: &str) -> ClusterResult<(u64, u64)> {
        let request = ClusterRequest::AddNode { node_address: node_address.to_string() };
        match self.call(&request).await? {
            ClusterResponse::AddNode { migrated_file_count, failed_file_count } => {
                Ok((migrated_file_count, failed_file_count))
            }
            other => Err(self.unexpected(other)),
        }
    }

    /// Returns `(migrated, failed)` file counts.
    pub async fn remove_node(&self, node_address: &str) -> ClusterResult<(u64, u64)> {
        let request = ClusterRequest::RemoveNode { node_address: node_address.to_string() };
        match self.call(&request).await? {
            ClusterResponse::RemoveNode { migrated_file_count, failed_file_count } => {
                Ok((migrated_file_count, failed_file_count))
            }
            other => Err(self.unexpected(other)),
        }
    }

    /// Returns `(migrated, failed)` file counts.
    pub async fn rebalance(&self, node_address: &str) -> ClusterResult<(u64, u64)> {
        let request = ClusterRequest::Rebalance { node_address: node_address.to_string() };
        match self.call(&request).await? {
            ClusterResponse::Rebalance { migrated_file_count, failed_file_count } => {
                Ok((migrated_file_count, failed_file_count))
            }
            other => Err(self.unexpected(other)),
        }
    }

    /// Returns `(migrated, failed)` file counts.
    pub async fn drain_node(&self, node_address: &str) -> ClusterResult<(u64, u64)> {
        let request = ClusterRequest::DrainNode { node_address: node_address.to_string() };
        match self.call(&request).await? {
            ClusterResponse::DrainNode { migrated_file_count, failed_file_count } => {
                Ok((migrated_file_count, failed_file_count))
            }
            other => Err(self.unexpected(other)),
        }
    }

    pub async fn read(&self, object_id: &str, filename: &str) -> ClusterResult<Vec<u8>> {
        let request = ClusterRequest::ReadObject {
            object_id: object_id.to_string(),
            filename: filename.to_string(),
        };
        match self.call(&request).await? {
            ClusterResponse::Object { data } => Ok(data),
            other => Err(self.unexpected(other)),
        }
    }

    pub async fn write(&self, object_id: &str, filename: &str, data: Vec<u8>) -> ClusterResult<()> {
        let request = ClusterRequest::WriteObject {
            object_id: object_id.to_string(),
            filename: filename.to_string(),
            data,
        };
        match self.call(&request).await? {
            ClusterResponse::Written => Ok(()),
            other => Err(self.unexpected(other)),
        }
    }

    pub async fn delete(&self, object_id: &str, filename: &str) -> ClusterResult<()> {
        let request = ClusterRequest::DeleteObject {
            object_id: object_id.to_string(),
            filename: filename.to_string(),
        };
        match self.call(&request).await? {
            ClusterResponse::Deleted => Ok(()),
            other => Err(self.unexpected(other)),
        }
    }
}
