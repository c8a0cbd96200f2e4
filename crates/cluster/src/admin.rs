//! Cluster administration: membership changes and the migrations they drive.
//!
//! All operations go through one async mutex, so at most one membership
//! change runs at a time. Routing keeps working during a change and always
//! uses the latest committed ring: right after `add_node` inserts the new
//! position, new writes for its range already land on it, while older keys
//! in that range become readable as they are migrated in.

use std::sync::Arc;

use corelib::NodeAddr;
use protocol::NodeEntry;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::client::NodeClient;
use crate::config::MigrationScan;
use crate::error::{ClusterError, ClusterResult};
use crate::migration::{migrate_and_record, MigrationReport};
use crate::router::RoutingClient;

pub struct AdminService {
    router: Arc<RoutingClient>,
    scan: MigrationScan,
    lock: Mutex<()>,
}

impl AdminService {
    pub fn new(router: Arc<RoutingClient>, scan: MigrationScan) -> Self {
        Self {
            router,
            scan,
            lock: Mutex::new(()),
        }
    }

    pub fn router(&self) -> &Arc<RoutingClient> {
        &self.router
    }

    /// Ring members in ascending position order.
    pub fn list_nodes(&self) -> Vec<NodeEntry> {
        let ring = self.router.ring_lock().read();
        ring.ownership()
            .into_iter()
            .map(|(node, ownership)| NodeEntry {
                address: node.to_string(),
                token: ring.hash(node.as_str()).into(),
                ownership,
            })
            .collect()
    }

    /// Add a node and pull into it every key it now owns.
    ///
    /// The connection is established before the position is inserted. With
    /// `MigrationScan::Full` every other node is scanned; with
    /// `MigrationScan::Successor` only the node that owned the split range.
    pub async fn add_node(&self, node_address: &str) -> ClusterResult<MigrationReport> {
        let _guard = self.lock.lock().await;
        let addr = NodeAddr::parse(node_address)?;
        {
            // Surface duplicates and position collisions before dialing.
            let mut probe = self.router.ring();
            if probe.contains(&addr) {
                return Err(ClusterError::AlreadyMember(addr.to_string()));
            }
            probe.add_node(addr.clone())?;
        }

        let client = NodeClient::connect(addr.clone(), self.router.timeout()).await?;
        let target = self.router.pool().insert(client);
        let token = {
            let mut ring = self.router.ring_lock().write();
            match ring.add_node(addr.clone()) {
                Ok(token) => token,
                Err(e) => {
                    drop(ring);
                    self.router.pool().remove(&addr);
                    return Err(e.into());
                }
            }
        };
        info!(node = %addr, %token, "node joined ring");

        let sources = self.sources_for(&addr, self.scan);
        let report = self.pull_into(&addr, &target, sources).await;
        info!(
            node = %addr,
            migrated = report.migrated,
            failed = report.failed,
            scanned = report.scanned,
            "add node complete"
        );
        Ok(report)
    }

    /// Pull into a member every key it owns that still sits elsewhere.
    ///
    /// This is the retry for an `add_node` whose migration partly failed:
    /// membership is left alone and every other node is scanned.
    pub async fn rebalance(&self, node_address: &str) -> ClusterResult<MigrationReport> {
        let _guard = self.lock.lock().await;
        let addr = NodeAddr::parse(node_address)?;
        let member = self.router.ring_lock().read().contains(&addr);
        if !member {
            return Err(ClusterError::NotMember(addr.to_string()));
        }
        let target = self.router.pool().get(&addr)?;
        let sources = self.sources_for(&addr, MigrationScan::Full);
        let report = self.pull_into(&addr, &target, sources).await;
        info!(
            node = %addr,
            migrated = report.migrated,
            failed = report.failed,
            "rebalance complete"
        );
        Ok(report)
    }

    fn sources_for(&self, addr: &NodeAddr, scan: MigrationScan) -> Vec<NodeAddr> {
        let ring = self.router.ring_lock().read();
        match scan {
            MigrationScan::Full => ring.nodes().into_iter().filter(|n| *n != addr).cloned().collect(),
            MigrationScan::Successor => ring.successor(addr).cloned().into_iter().collect(),
        }
    }

    async fn pull_into(&self, addr: &NodeAddr, target: &NodeClient, sources: Vec<NodeAddr>) -> MigrationReport {
        let mut report = MigrationReport::default();
        for source in sources {
            report += self.pull_from(&source, addr, target).await;
        }
        report
    }

    /// Move keys that `target` now owns off `source`.
    async fn pull_from(&self, source: &NodeAddr, addr: &NodeAddr, target: &NodeClient) -> MigrationReport {
        let mut report = MigrationReport::default();
        let client = match self.router.pool().get(source) {
            Ok(client) => client,
            Err(e) => {
                warn!(node = %source, error = %e, "skipping source without connection");
                report.unreachable += 1;
                return report;
            }
        };
        let keys = match client.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(node = %source, error = %e, "could not list keys, skipping");
                report.unreachable += 1;
                return report;
            }
        };
        for key in keys {
            report.scanned += 1;
            let owner = match self.router.ring_lock().read().owner(&key) {
                Ok(owner) => owner.clone(),
                Err(e) => {
                    warn!(%key, error = %e, "no owner for key");
                    report.failed += 1;
                    continue;
                }
            };
            if owner == *addr {
                migrate_and_record(&key, &client, target, &mut report).await;
            }
        }
        report
    }

    /// Remove a node and push each of its keys to the key's new owner.
    ///
    /// The position and connection are dropped from the ring before
    /// migrating, so new owners are computed on the post-removal ring. The
    /// departing node must still be reachable for its data to move.
    pub async fn remove_node(&self, node_address: &str) -> ClusterResult<MigrationReport> {
        let _guard = self.lock.lock().await;
        let addr = NodeAddr::parse(node_address)?;
        {
            let mut ring = self.router.ring_lock().write();
            if !ring.contains(&addr) {
                return Err(ClusterError::NotMember(addr.to_string()));
            }
            if ring.len() == 1 {
                return Err(ClusterError::LastNode(addr.to_string()));
            }
            ring.remove_node(&addr)?;
        }
        let departing = self
            .router
            .pool()
            .remove(&addr)
            .ok_or_else(|| ClusterError::NoConnection(addr.to_string()))?;
        info!(node = %addr, "node left ring");

        let report = self.push_out(&addr, &departing).await?;
        info!(
            node = %addr,
            migrated = report.migrated,
            failed = report.failed,
            "remove node complete"
        );
        Ok(report)
    }

    /// Push every key left on a non-member to its owner.
    ///
    /// This is the retry for a `remove_node` whose migration partly failed
    /// or whose node was briefly unreachable. The node is dialed afresh.
    pub async fn drain(&self, node_address: &str) -> ClusterResult<MigrationReport> {
        let _guard = self.lock.lock().await;
        let addr = NodeAddr::parse(node_address)?;
        let member = self.router.ring_lock().read().contains(&addr);
        if member {
            return Err(ClusterError::AlreadyMember(addr.to_string()));
        }
        let departed = NodeClient::connect(addr.clone(), self.router.timeout()).await?;
        let report = self.push_out(&addr, &departed).await?;
        info!(
            node = %addr,
            migrated = report.migrated,
            failed = report.failed,
            "drain complete"
        );
        Ok(report)
    }

    /// Move every key on `source` to its owner under the current ring.
    async fn push_out(&self, addr: &NodeAddr, source: &NodeClient) -> ClusterResult<MigrationReport> {
        let keys = source.list_keys().await.map_err(|e| {
            error!(node = %addr, error = %e, "node unreachable, its objects stay where they are");
            e
        })?;

        let mut report = MigrationReport::default();
        for key in keys {
            report.scanned += 1;
            let target = {
                let owner = self.router.ring_lock().read().owner(&key).cloned();
                owner.map_err(ClusterError::from).and_then(|owner| self.router.pool().get(&owner))
            };
            match target {
                Ok(target) => migrate_and_record(&key, source, &target, &mut report).await,
                Err(e) => {
                    warn!(%key, error = %e, "no destination for key");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}
