//! Storage node for ringstore.
//!
//! A storage node owns one local directory and exposes write, read, delete
//! and list-all-keys over the wire. It knows nothing about the ring or the
//! other nodes.

pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use config::NodeConfig;
pub use error::{StorageError, StorageResult};
pub use service::{serve, StorageService};
pub use store::FsStore;
