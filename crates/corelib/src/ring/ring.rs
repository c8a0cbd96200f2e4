//! Hash ring data structure.
//!
//! Holds a `BTreeMap<Token, NodeAddr>`: the map keeps positions sorted and
//! doubles as the position → address mapping. Each node owns exactly one
//! position, so the map is a bijection over registered nodes.
//!
//! # Ownership
//!
//! A key is owned by the node at the smallest position `>=` the key's hash.
//! A hash above every position wraps around to the smallest position.
//!
//! ```text
//!   0 ──── n1 ──────── n2 ──────── n3 ──── 2^64
//!    (n3,n1] → n1   (n1,n2] → n2   (n2,n3] → n3,  and (n3, 2^64) ∪ [0, n1] → n1
//! ```

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use crate::error::{Error, Result};
use crate::node::NodeAddr;
use crate::partitioner::{Blake3Partitioner, Partitioner};
use crate::token::Token;

/// Consistent hash ring with one position per node.
///
/// Pure data structure: no I/O, no interior mutability. Callers that share a
/// ring across tasks wrap it in a lock.
#[derive(Clone, Debug)]
pub struct HashRing<P: Partitioner = Blake3Partitioner> {
    partitioner: P,
    positions: BTreeMap<P::TokenType, NodeAddr>,
}

impl HashRing<Blake3Partitioner> {
    /// Create an empty ring using the default partitioner.
    pub fn new() -> Self {
        Self::with_partitioner(Blake3Partitioner)
    }

    /// Build a ring from a list of addresses.
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a NodeAddr>) -> Result<Self> {
        let mut ring = Self::new();
        for node in nodes {
            ring.add_node(node.clone())?;
        }
        Ok(ring)
    }
}

impl Default for HashRing<Blake3Partitioner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> HashRing<P> {
    pub fn with_partitioner(partitioner: P) -> Self {
        Self {
            partitioner,
            positions: BTreeMap::new(),
        }
    }

    /// Position of an arbitrary string on this ring.
    pub fn hash(&self, value: &str) -> P::TokenType {
        self.partitioner.partition(value.as_bytes())
    }

    /// Insert a node at the position of its hashed address.
    ///
    /// Fails if the address is already present, or if a different address
    /// already occupies the same position.
    pub fn add_node(&mut self, node: NodeAddr) -> Result<P::TokenType> {
        let token = self.hash(node.as_str());
        if let Some(existing) = self.positions.get(&token) {
            return Err(if *existing == node {
                Error::DuplicateNode(node.to_string())
            } else {
                Error::PositionCollision {
                    new: node.to_string(),
                    existing: existing.to_string(),
                    position: token.to_string(),
                }
            });
        }
        self.positions.insert(token.clone(), node);
        Ok(token)
    }

    /// Remove a node and its position.
    pub fn remove_node(&mut self, node: &NodeAddr) -> Result<P::TokenType> {
        let token = self.hash(node.as_str());
        match self.positions.get(&token) {
            Some(existing) if existing == node => {
                self.positions.remove(&token);
                Ok(token)
            }
            _ => Err(Error::UnknownNode(node.to_string())),
        }
    }

    /// Node responsible for `key` under the current ring state.
    ///
    /// # Errors
    ///
    /// `Error::EmptyRing` if no node is registered.
    pub fn owner(&self, key: &str) -> Result<&NodeAddr> {
        self.owner_of_token(&self.hash(key))
    }

    /// Node responsible for a position: the first node at or after it,
    /// wrapping to the first node on the ring.
    pub fn owner_of_token(&self, token: &P::TokenType) -> Result<&NodeAddr> {
        self.positions
            .range(token..)
            .next()
            .or_else(|| self.positions.iter().next())
            .map(|(_, node)| node)
            .ok_or(Error::EmptyRing)
    }

    /// Next node clockwise from `node`, i.e. the node that owned `node`'s
    /// range before `node` was inserted.
    ///
    /// Returns `None` if `node` is not on the ring or is the only node.
    pub fn successor(&self, node: &NodeAddr) -> Option<&NodeAddr> {
        let token = self.token_of(node)?;
        self.positions
            .range((Excluded(&token), Unbounded))
            .next()
            .or_else(|| self.positions.iter().next())
            .map(|(_, next)| next)
            .filter(|next| *next != node)
    }

    /// Position of `node`, if it is on the ring.
    pub fn token_of(&self, node: &NodeAddr) -> Option<P::TokenType> {
        let token = self.hash(node.as_str());
        match self.positions.get(&token) {
            Some(existing) if existing == node => Some(token),
            _ => None,
        }
    }

    pub fn contains(&self, node: &NodeAddr) -> bool {
        self.token_of(node).is_some()
    }

    /// All nodes, walked in ascending position order.
    pub fn nodes(&self) -> Vec<&NodeAddr> {
        self.positions.values().collect()
    }

    /// All `(position, node)` pairs in ascending position order.
    pub fn tokens(&self) -> Vec<(P::TokenType, &NodeAddr)> {
        self.positions
            .iter()
            .map(|(token, node)| (token.clone(), node))
            .collect()
    }

    /// Fraction of the hash space each node owns, in ring order.
    ///
    /// A node owns the arc from its predecessor (exclusive) to itself
    /// (inclusive). A lone node owns the whole ring.
    pub fn ownership(&self) -> Vec<(&NodeAddr, f64)> {
        if self.positions.len() == 1 {
            return self.positions.values().map(|node| (node, 1.0)).collect();
        }
        let mut previous = match self.positions.keys().next_back() {
            Some(last) => last,
            None => return Vec::new(),
        };
        let mut shares = Vec::with_capacity(self.positions.len());
        for (token, node) in &self.positions {
            shares.push((node, previous.fraction_to(token)));
            previous = token;
        }
        shares
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }
}
