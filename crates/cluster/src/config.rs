//! Cluster service configuration.
//!
//! Loaded from a JSON file and/or command-line flags. Every field has a
//! default, so a partial file is valid.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Address the cluster service (admin + object gateway) listens on.
    pub listen_addr: SocketAddr,
    pub backend: Backend,
    /// Per-call limit on storage node requests. `0` disables it.
    pub request_timeout_ms: u64,
    pub migration_scan: MigrationScan,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8081)),
            backend: Backend::Network { nodes: Vec::new() },
            request_timeout_ms: 30_000,
            migration_scan: MigrationScan::Full,
        }
    }
}

impl ClusterConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> ClusterResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| ClusterError::Config(format!("{}: {e}", path.display())))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn validate(&self) -> ClusterResult<()> {
        if let Backend::Network { nodes } = &self.backend {
            if nodes.is_empty() {
                return Err(ClusterError::Config("network backend needs at least one storage node".into()));
            }
        }
        Ok(())
    }
}

/// Where object bytes live.
///
/// Textual form: `fs:<dir>` or `nw:<node>,<node>,...`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backend {
    /// One local directory, no ring.
    Local { root: PathBuf },
    /// A ring of storage nodes.
    Network { nodes: Vec<String> },
}

impl FromStr for Backend {
    type Err = ClusterError;

    fn from_str(s: &str) -> ClusterResult<Self> {
        match s.split_once(':') {
            Some(("fs", root)) if !root.is_empty() => Ok(Backend::Local { root: root.into() }),
            Some(("nw", nodes)) => Ok(Backend::Network {
                nodes: nodes
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_owned)
                    .collect(),
            }),
            _ => Err(ClusterError::Config(format!(
                "{s:?}: expected fs:<dir> or nw:<node>,<node>,..."
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Local { root } => write!(f, "fs:{}", root.display()),
            Backend::Network { nodes } => write!(f, "nw:{}", nodes.join(",")),
        }
    }
}

/// Which nodes `add_node` scans for keys to pull into the new node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationScan {
    /// Every other node. Simple and does not depend on ring geometry.
    #[default]
    Full,
    /// Only the new node's successor, the sole previous owner of its range.
    Successor,
}

impl FromStr for MigrationScan {
    type Err = ClusterError;

    fn from_str(s: &str) -> ClusterResult<Self> {
        match s {
            "full" => Ok(Self::Full),
            "successor" => Ok(Self::Successor),
            other => Err(ClusterError::Config(format!("unknown migration scan {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ClusterConfig::default();
        assert_eq!(c.listen_addr, "127.0.0.1:8081".parse::<SocketAddr>().unwrap());
        assert_eq!(c.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(c.migration_scan, MigrationScan::Full);
        assert!(c.validate().is_err());
    }

    #[test]
    fn parse_backends() {
        assert_eq!(
            "fs:/var/lib/ringstore".parse::<Backend>().unwrap(),
            Backend::Local { root: "/var/lib/ringstore".into() }
        );
        assert_eq!(
            "nw:localhost:8090, localhost:8091".parse::<Backend>().unwrap(),
            Backend::Network { nodes: vec!["localhost:8090".into(), "localhost:8091".into()] }
        );
        assert!("s3:bucket".parse::<Backend>().is_err());
        assert!("fs:".parse::<Backend>().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: ClusterConfig = serde_json::from_str(
            r#"{"backend": {"type": "network", "nodes": ["localhost:8090"]}, "request_timeout_ms": 0}"#,
        )
        .unwrap();
        assert_eq!(c.request_timeout(), None);
        assert_eq!(c.listen_addr.port(), 8081);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parse_migration_scan() {
        assert_eq!("successor".parse::<MigrationScan>().unwrap(), MigrationScan::Successor);
        assert!("nearest".parse::<MigrationScan>().is_err());
    }
}
