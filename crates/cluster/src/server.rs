//! Cluster service: administration and object gateway on one listener.

use std::sync::Arc;

use async_trait::async_trait;
use protocol::{ClusterRequest, ClusterResponse, ProtocolError, Receiver, RemoteError, Service};
use tracing::{info, warn};

use crate::admin::AdminService;
use crate::config::{Backend, ClusterConfig};
use crate::content::{ContentStore, LocalContentStore};
use crate::error::{ClusterError, ClusterResult};
use crate::migration::MigrationReport;
use crate::router::RoutingClient;

pub struct ClusterService {
    content: Arc<dyn ContentStore>,
    /// Present only with a network backend.
    admin: Option<Arc<AdminService>>,
}

impl ClusterService {
    /// Cluster over storage nodes.
    pub fn network(admin: Arc<AdminService>) -> Self {
        Self {
            content: Arc::clone(admin.router()) as Arc<dyn ContentStore>,
            admin: Some(admin),
        }
    }

    /// Single local directory; admin requests answer `Unsupported`.
    pub fn local(store: LocalContentStore) -> Self {
        Self {
            content: Arc::new(store),
            admin: None,
        }
    }

    /// Build the service described by `config`, connecting to its nodes.
    pub async fn from_config(config: &ClusterConfig) -> ClusterResult<Self> {
        config.validate()?;
        match &config.backend {
            Backend::Local { root } => Ok(Self::local(LocalContentStore::open(root).await?)),
            Backend::Network { nodes } => {
                let router = RoutingClient::connect(nodes, config.request_timeout()).await?;
                let admin = AdminService::new(Arc::new(router), config.migration_scan);
                Ok(Self::network(Arc::new(admin)))
            }
        }
    }

    fn admin(&self) -> ClusterResult<&AdminService> {
        self.admin
            .as_deref()
            .ok_or_else(|| ClusterError::Unsupported("membership changes need a network backend".into()))
    }

    async fn dispatch(&self, request: ClusterRequest) -> ClusterResult<ClusterResponse> {
        match request {
            ClusterRequest::ListNodes => Ok(ClusterResponse::ListNodes {
                nodes: self.admin()?.list_nodes(),
            }),
            ClusterRequest::AddNode { node_address } => {
                let report = self.admin()?.add_node(&node_address).await?;
                let (migrated_file_count, failed_file_count) = counts(&report);
                Ok(ClusterResponse::AddNode { migrated_file_count, failed_file_count })
            }
            ClusterRequest::RemoveNode { node_address } => {
                let report = self.admin()?.remove_node(&node_address).await?;
                let (migrated_file_count, failed_file_count) = counts(&report);
                Ok(ClusterResponse::RemoveNode { migrated_file_count, failed_file_count })
            }
            ClusterRequest::Rebalance { node_address } => {
                let report = self.admin()?.rebalance(&node_address).await?;
                let (migrated_file_count, failed_file_count) = counts(&report);
                Ok(ClusterResponse::Rebalance { migrated_file_count, failed_file_count })
            }
            ClusterRequest::DrainNode { node_address } => {
                let report = self.admin()?.drain(&node_address).await?;
                let (migrated_file_count, failed_file_count) = counts(&report);
                Ok(ClusterResponse::DrainNode { migrated_file_count, failed_file_count })
            }
            ClusterRequest::ReadObject { object_id, filename } => {
                let data = self.content.read(&object_id, &filename).await?;
                Ok(ClusterResponse::Object { data })
            }
            ClusterRequest::WriteObject { object_id, filename, data } => {
                self.content.write(&object_id, &filename, data).await?;
                Ok(ClusterResponse::Written)
            }
            ClusterRequest::DeleteObject { object_id, filename } => {
                self.content.delete(&object_id, &filename).await?;
                Ok(ClusterResponse::Deleted)
            }
        }
    }

    /// Bind `config.listen_addr` and serve until the process exits.
    pub async fn serve(self, config: &ClusterConfig) -> ClusterResult<()> {
        let listener_error = |source: ProtocolError| ClusterError::Listener {
            addr: config.listen_addr.to_string(),
            source,
        };
        let receiver = Receiver::bind(config.listen_addr, Arc::new(self))
            .await
            .map_err(listener_error)?;
        info!(addr = %config.listen_addr, backend = %config.backend, "cluster service ready");
        receiver.run().await.map_err(listener_error)
    }
}

fn counts(report: &MigrationReport) -> (u64, u64) {
    (report.migrated as u64, report.failed as u64)
}

#[async_trait]
impl Service for ClusterService {
    type Request = ClusterRequest;
    type Response = ClusterResponse;

    async fn call(&self, request: ClusterRequest) -> ClusterResponse {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                let kind = e.kind();
                if kind != protocol::ErrorKind::NotFound {
                    warn!(error = %e, "cluster request failed");
                }
                ClusterResponse::Error(RemoteError::new(kind, e.to_string()))
            }
        }
    }
}
