//! Routing client.
//!
//! Presents the same read/write contract as a single storage node and sends
//! each call to whichever node owns the key under the current ring.
//!
//! The ring sits behind a `parking_lot::RwLock` that is only held for the
//! ownership lookup, never across a remote call. A node is always put in
//! the connection pool before it is put on the ring, so every routing
//! decision lands on a node with a live connection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use corelib::{HashRing, NodeAddr, ObjectKey};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::client::NodeClient;
use crate::content::ContentStore;
use crate::error::{ClusterError, ClusterResult};
use crate::pool::ConnectionPool;

pub struct RoutingClient {
    ring: RwLock<HashRing>,
    pool: ConnectionPool,
    timeout: Option<Duration>,
}

impl RoutingClient {
    /// Connect to every node and build the ring.
    ///
    /// Fails on a malformed or duplicate address, or if any node cannot be
    /// reached.
    pub async fn connect(nodes: &[String], timeout: Option<Duration>) -> ClusterResult<Self> {
        let mut ring = HashRing::new();
        let pool = ConnectionPool::new();
        for node in nodes {
            let addr = NodeAddr::parse(node)?;
            if ring.contains(&addr) {
                return Err(ClusterError::Ring(corelib::Error::DuplicateNode(addr.to_string())));
            }
            let client = NodeClient::connect(addr.clone(), timeout).await?;
            pool.insert(client);
            ring.add_node(addr)?;
        }
        info!(nodes = ring.len(), "routing client connected");
        Ok(Self {
            ring: RwLock::new(ring),
            pool,
            timeout,
        })
    }

    /// Owner of `key` and its connection under the current ring.
    pub fn route(&self, key: &str) -> ClusterResult<Arc<NodeClient>> {
        let owner = self.ring.read().owner(key)?.clone();
        self.pool.get(&owner)
    }

    pub fn owner_of(&self, object_id: &str, filename: &str) -> ClusterResult<NodeAddr> {
        let key = ObjectKey::new(object_id, filename)?;
        Ok(self.ring.read().owner(&key.encoded())?.clone())
    }

    pub async fn read(&self, object_id: &str, filename: &str) -> ClusterResult<Vec<u8>> {
        let key = ObjectKey::new(object_id, filename)?.encoded();
        let node = self.route(&key)?;
        debug!(%key, node = %node.addr(), "read");
        node.read_file(&key).await
    }

    pub async fn write(&self, object_id: &str, filename: &str, data: Vec<u8>) -> ClusterResult<()> {
        let key = ObjectKey::new(object_id, filename)?.encoded();
        let node = self.route(&key)?;
        debug!(%key, node = %node.addr(), bytes = data.len(), "write");
        node.write_file(&key, data).await
    }

    pub async fn delete(&self, object_id: &str, filename: &str) -> ClusterResult<()> {
        let key = ObjectKey::new(object_id, filename)?.encoded();
        let node = self.route(&key)?;
        debug!(%key, node = %node.addr(), "delete");
        node.delete_file(&key).await
    }

    /// Members in ascending ring order.
    pub fn nodes(&self) -> Vec<NodeAddr> {
        self.ring.read().nodes().into_iter().cloned().collect()
    }

    /// Copy of the current ring.
    pub fn ring(&self) -> HashRing {
        self.ring.read().clone()
    }

    pub(crate) fn ring_lock(&self) -> &RwLock<HashRing> {
        &self.ring
    }

    pub(crate) fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl ContentStore for RoutingClient {
    async fn read(&self, object_id: &str, filename: &str) -> ClusterResult<Vec<u8>> {
        RoutingClient::read(self, object_id, filename).await
    }

    async fn write(&self, object_id: &str, filename: &str, data: Vec<u8>) -> ClusterResult<()> {
        RoutingClient::write(self, object_id, filename, data).await
    }

    async fn delete(&self, object_id: &str, filename: &str) -> ClusterResult<()> {
        RoutingClient::delete(self, object_id, filename).await
    }
}
