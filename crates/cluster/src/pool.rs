//! Connections to the storage nodes, owned by the routing client.

use std::sync::Arc;

use corelib::NodeAddr;
use dashmap::DashMap;

use crate::client::NodeClient;
use crate::error::{ClusterError, ClusterResult};

/// Map from node address to its live connection.
#[derive(Default, Debug)]
pub struct ConnectionPool {
    clients: DashMap<NodeAddr, Arc<NodeClient>>,
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, client: NodeClient) -> Arc<NodeClient> {
        let client = Arc::new(client);
        self.clients.insert(client.addr().clone(), Arc::clone(&client));
        client
    }

    pub fn get(&self, addr: &NodeAddr) -> ClusterResult<Arc<NodeClient>> {
        self.clients
            .get(addr)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ClusterError::NoConnection(addr.to_string()))
    }

    /// Drop the pool's handle. In-flight callers keep theirs until done.
    pub fn remove(&self, addr: &NodeAddr) -> Option<Arc<NodeClient>> {
        self.clients.remove(addr).map(|(_, client)| client)
    }

    pub fn contains(&self, addr: &NodeAddr) -> bool {
        self.clients.contains_key(addr)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
