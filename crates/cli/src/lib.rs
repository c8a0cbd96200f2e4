//! Command line front end for ringstore.
//!
//! Provides commands for:
//! - Running a storage node or the cluster service
//! - Adding, removing and listing nodes
//! - Putting, getting and deleting objects
//! - Inspecting where a key hashes to

pub mod commands;
pub mod config;

pub use commands::run;
pub use config::{CliConfig, Command};
