use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cluster::{Backend, ClusterConfig, MigrationScan};

#[derive(Debug, Parser)]
#[command(name = "ringstore")]
#[command(about = "Content-addressable object store on a consistent hash ring", long_about = None)]
#[command(version)]
pub struct CliConfig {
    /// Log filter, e.g. `info` or `cluster=debug,info`
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a storage node
    Node(NodeArgs),
    /// Run the cluster service (routing, admin and object gateway)
    Serve(ServeArgs),
    /// Cluster membership
    Admin {
        /// Cluster service address
        #[arg(long, default_value = "127.0.0.1:8081")]
        server: String,
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Object operations through the cluster service
    Object {
        /// Cluster service address
        #[arg(long, default_value = "127.0.0.1:8081")]
        server: String,
        #[command(subcommand)]
        action: ObjectAction,
    },
    /// Print the ring token of a value and, given nodes, its owner
    Hash {
        value: String,
        /// Comma-separated node addresses
        #[arg(long, value_delimiter = ',')]
        nodes: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub struct NodeArgs {
    #[arg(long, default_value = "localhost")]
    pub host: String,
    #[arg(long, default_value_t = 8090)]
    pub port: u16,
    /// Directory holding this node's objects
    pub base_dir: PathBuf,
}

impl NodeArgs {
    pub fn into_config(self) -> storage::NodeConfig {
        storage::NodeConfig {
            bind_addr: format!("{}:{}", self.host, self.port),
            base_dir: self.base_dir,
        }
    }
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub listen: Option<SocketAddr>,
    /// `fs:<dir>` or `nw:<node>,<node>,...`
    #[arg(long)]
    pub content: Option<Backend>,
    /// `full` or `successor`
    #[arg(long)]
    pub scan: Option<MigrationScan>,
    /// Per-call timeout towards storage nodes, 0 disables
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ServeArgs {
    pub fn into_config(self) -> cluster::ClusterResult<ClusterConfig> {
        let mut config = match &self.config {
            Some(path) => ClusterConfig::from_json_file(path)?,
            None => ClusterConfig::default(),
        };
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(content) = self.content {
            config.backend = content;
        }
        if let Some(scan) = self.scan {
            config.migration_scan = scan;
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// List nodes in ring order
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a node and pull in the objects it now owns
    Add { node: String },
    /// Drain a node and remove it
    Remove { node: String },
    /// Retry pulling into a member the keys a failed add left behind
    Rebalance { node: String },
    /// Retry pushing off a removed node the keys a failed remove left behind
    Drain { node: String },
}

#[derive(Debug, Subcommand)]
pub enum ObjectAction {
    /// Store a local file as <object_id>/<filename>
    Put {
        object_id: String,
        filename: String,
        file: PathBuf,
    },
    /// Fetch an object; writes to stdout unless --out is given
    Get {
        object_id: String,
        filename: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Delete { object_id: String, filename: String },
    /// Store every file of a directory (manifest and segments) under object_id
    Upload { object_id: String, dir: PathBuf },
}
