//! Ring positions.

pub mod digest;
pub mod traits;

pub use digest::DigestToken;
pub use traits::Token;
