use crate::token::Token;

/// Maps node addresses and object keys onto ring positions.
///
/// Every process computing ownership must agree on the partitioner, so
/// implementations are pure functions of the input bytes.
pub trait Partitioner: Send + Sync + 'static {
    type TokenType: Token;

    fn partition(&self, key: &[u8]) -> Self::TokenType;

    /// Shown in ring dumps and logs.
    fn name(&self) -> &'static str;
}
