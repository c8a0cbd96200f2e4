//! Remote surface of a storage node.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use protocol::{ErrorKind, Receiver, RemoteError, Service, StorageRequest, StorageResponse};
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::error::{StorageError, StorageResult};
use crate::store::FsStore;

pub struct StorageService {
    store: FsStore,
}

impl StorageService {
    pub fn new(store: FsStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FsStore {
        &self.store
    }

    async fn dispatch(&self, request: StorageRequest) -> StorageResult<StorageResponse> {
        match request {
            StorageRequest::WriteFile { key, data } => {
                counter!("storage_requests_total", "op" => "write").increment(1);
                self.store.write(&key, &data).await?;
                Ok(StorageResponse::WriteFile { success: true })
            }
            StorageRequest::ReadFile { key } => {
                counter!("storage_requests_total", "op" => "read").increment(1);
                let data = self.store.read(&key).await?;
                Ok(StorageResponse::ReadFile { data })
            }
            StorageRequest::DeleteFile { key } => {
                counter!("storage_requests_total", "op" => "delete").increment(1);
                self.store.delete(&key).await?;
                Ok(StorageResponse::DeleteFile { success: true })
            }
            StorageRequest::ListKeys => {
                counter!("storage_requests_total", "op" => "list").increment(1);
                let keys = self.store.list_keys().await?;
                Ok(StorageResponse::ListKeys {
                    keys: keys.into_iter().collect(),
                })
            }
        }
    }
}

#[async_trait]
impl Service for StorageService {
    type Request = StorageRequest;
    type Response = StorageResponse;

    async fn call(&self, request: StorageRequest) -> StorageResponse {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                let kind = match &e {
                    StorageError::NotFound(_) => ErrorKind::NotFound,
                    StorageError::InvalidKey(_) => ErrorKind::InvalidArgument,
                    StorageError::Io { .. } => ErrorKind::Io,
                    StorageError::Protocol(_) => ErrorKind::Internal,
                };
                if kind != ErrorKind::NotFound {
                    warn!(error = %e, "storage request failed");
                }
                StorageResponse::Error(RemoteError::new(kind, e.to_string()))
            }
        }
    }
}

/// Open the store and serve it until the process exits.
pub async fn serve(config: &NodeConfig) -> StorageResult<()> {
    let store = FsStore::open(&config.base_dir).await?;
    let receiver = Receiver::bind(config.bind_addr.as_str(), Arc::new(StorageService::new(store))).await?;
    info!(
        addr = %config.bind_addr,
        base_dir = %config.base_dir.display(),
        "storage node ready"
    );
    receiver.run().await?;
    Ok(())
}
