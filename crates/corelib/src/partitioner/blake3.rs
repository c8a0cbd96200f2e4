//! BLAKE3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::DigestToken;

/// Places keys by the first 8 bytes (big-endian) of their BLAKE3 digest.
///
/// A cryptographic digest keeps node and key positions uniformly spread and
/// makes a collision between two node addresses negligible.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Partitioner;

impl Partitioner for Blake3Partitioner {
    type TokenType = DigestToken;

    fn partition(&self, key: &[u8]) -> Self::TokenType {
        let digest = blake3::hash(key);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);
        DigestToken(u64::from_be_bytes(prefix))
    }

    fn name(&self) -> &'static str {
        "Blake3Partitioner"
    }
}
