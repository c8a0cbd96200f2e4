//! Consistent hash ring implementation.
//!
//! The ring manages node positions and provides lookup operations for
//! finding the node responsible for a key.

#[allow(clippy::module_inception)]
pub mod ring;

pub use ring::HashRing;
