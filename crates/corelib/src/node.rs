//! Node addresses.
//!
//! A storage node is identified only by the `host:port` it listens on. The
//! address is what gets hashed onto the ring, so two spellings of the same
//! endpoint (`localhost:8090` and `127.0.0.1:8090`) are different nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Network address of a storage node, validated as `host:port`.
///
/// Cheap to clone; heavy per-node state (connections) lives in the cluster
/// crate, keyed by this type.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeAddr(String);

impl NodeAddr {
    /// Parse and validate an address.
    pub fn parse(addr: &str) -> Result<Self> {
        let addr = addr.trim();
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidNode(format!("{addr}: missing port")))?;
        if host.is_empty() {
            return Err(Error::InvalidNode(format!("{addr}: missing host")));
        }
        match port.parse::<u16>() {
            Ok(0) | Err(_) => Err(Error::InvalidNode(format!("{addr}: invalid port"))),
            Ok(_) => Ok(Self(addr.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodeAddr {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<NodeAddr> for String {
    fn from(addr: NodeAddr) -> Self {
        addr.0
    }
}

impl AsRef<str> for NodeAddr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
