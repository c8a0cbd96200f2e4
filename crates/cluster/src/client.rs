//! Typed client for one storage node.

use std::time::Duration;

use corelib::NodeAddr;
use protocol::{ErrorKind, RemoteError, Sender, StorageRequest, StorageResponse};

use crate::error::{ClusterError, ClusterResult};

/// Persistent connection to a storage node.
pub struct NodeClient {
    addr: NodeAddr,
    sender: Sender<StorageRequest, StorageResponse>,
}

impl NodeClient {
    pub async fn connect(addr: NodeAddr, timeout: Option<Duration>) -> ClusterResult<Self> {
        let sender = Sender::connect(addr.as_str(), timeout)
            .await
            .map_err(|e| ClusterError::transport(addr.as_str(), e))?;
        Ok(Self { addr, sender })
    }

    pub fn addr(&self) -> &NodeAddr {
        &self.addr
    }

    async fn call(&self, request: &StorageRequest) -> ClusterResult<StorageResponse> {
        self.sender
            .call(request)
            .await
            .map_err(|e| ClusterError::transport(self.addr.as_str(), e))
    }

    fn remote_error(&self, key: Option<&str>, error: RemoteError) -> ClusterError {
        match (error.kind, key) {
            (ErrorKind::NotFound, Some(key)) => ClusterError::NotFound { key: key.to_string() },
            (kind, _) => ClusterError::Remote {
                node: self.addr.to_string(),
                kind,
                message: error.message,
            },
        }
    }

    fn unexpected(&self, response: StorageResponse) -> ClusterError {
        ClusterError::UnexpectedResponse {
            node: self.addr.to_string(),
            response: format!("{response:?}"),
        }
    }

    pub async fn write_file(&self, key: &str, data: Vec<u8>) -> ClusterResult<()> {
        let request = StorageRequest::WriteFile {
            key: key.to_string(),
            data,
        };
        match self.call(&request).await? {
            StorageResponse::WriteFile { success: true } => Ok(()),
            StorageResponse::WriteFile { success: false } => Err(ClusterError::WriteRejected {
                node: self.addr.to_string(),
                key: key.to_string(),
            }),
            StorageResponse::Error(e) => Err(self.remote_error(Some(key), e)),
            other => Err(self.unexpected(other)),
        }
    }

    pub async fn read_file(&self, key: &str) -> ClusterResult<Vec<u8>> {
        let request = StorageRequest::ReadFile { key: key.to_string() };
        match self.call(&request).await? {
            StorageResponse::ReadFile { data } => Ok(data),
            StorageResponse::Error(e) => Err(self.remote_error(Some(key), e)),
            other => Err(self.unexpected(other)),
        }
    }

    pub async fn delete_file(&self, key: &str) -> ClusterResult<()> {
        let request = StorageRequest::DeleteFile { key: key.to_string() };
        match self.call(&request).await? {
            StorageResponse::DeleteFile { success: true } => Ok(()),
            StorageResponse::DeleteFile { success: false } => Err(ClusterError::Remote {
                node: self.addr.to_string(),
                kind: ErrorKind::Io,
                message: format!("delete of {key} failed"),
            }),
            StorageResponse::Error(e) => Err(self.remote_error(None, e)),
            other => Err(self.unexpected(other)),
        }
    }

    pub async fn list_keys(&self) -> ClusterResult<Vec<String>> {
        match self.call(&StorageRequest::ListKeys).await? {
            StorageResponse::ListKeys { keys } => Ok(keys),
            StorageResponse::Error(e) => Err(self.remote_error(None, e)),
            other => Err(self.unexpected(other)),
        }
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient").field("addr", &self.addr).finish()
    }
}
