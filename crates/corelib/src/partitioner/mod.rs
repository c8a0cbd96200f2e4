//! Hash functions placing nodes and keys on the ring.

pub mod blake3;
pub mod traits;

pub use self::blake3::Blake3Partitioner;
pub use traits::Partitioner;
