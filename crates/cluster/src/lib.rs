//! Cluster layer for ringstore.
//!
//! This crate ties the ring to live storage nodes:
//! - `RoutingClient` sends each object operation to the node owning its key
//! - `AdminService` adds and removes nodes and migrates the affected objects
//! - `ContentStore` abstracts over the routed cluster and a single local store
//! - `ClusterService` / `ClusterClient` expose all of the above over the wire

pub mod admin;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod migration;
pub mod pool;
pub mod remote;
pub mod router;
pub mod server;

pub use admin::AdminService;
pub use client::NodeClient;
pub use config::{Backend, ClusterConfig, MigrationScan};
pub use content::{upload_dir, ContentStore, LocalContentStore};
pub use error::{ClusterError, ClusterResult};
pub use migration::MigrationReport;
pub use pool::ConnectionPool;
pub use remote::ClusterClient;
pub use router::RoutingClient;
pub use server::ClusterService;
