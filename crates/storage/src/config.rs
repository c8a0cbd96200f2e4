use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// `host:port` the node listens on. This is also its ring identity.
    pub bind_addr: String,
    pub base_dir: PathBuf,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "localhost:8090".into(),
            base_dir: PathBuf::from("./storage"),
        }
    }
}
