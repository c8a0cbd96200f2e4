//! Core library for the ringstore consistent hashing layer.
//!
//! This crate is pure and performs no I/O. It provides:
//! - Token types and the partitioner that places strings on the ring
//! - The `HashRing` that maps keys to the node owning them
//! - Node addresses and object keys shared by every other crate

pub mod error;
pub mod key;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;

pub use error::{Error, Result};
pub use key::{ObjectKey, KEY_SEPARATOR};
pub use node::NodeAddr;
pub use partitioner::{Blake3Partitioner, Partitioner};
pub use ring::HashRing;
pub use token::{DigestToken, Token};

/// Hashes `value` onto the default ring coordinate space.
///
/// Node addresses and object keys both go through this function, so they
/// share a single 64-bit space.
pub fn hash(value: &str) -> u64 {
    Blake3Partitioner.partition(value.as_bytes()).0
}
