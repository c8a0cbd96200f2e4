//! 64-bit token produced by truncating a cryptographic digest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::token::traits::Token;

/// Position on a ring of size 2^64.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DigestToken(pub u64);

impl Token for DigestToken {
    fn zero() -> Self {
        DigestToken(0)
    }

    fn max() -> Self {
        DigestToken(u64::MAX)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn is_max(&self) -> bool {
        self.0 == u64::MAX
    }

    fn distance_to(&self, other: &Self) -> Self {
        DigestToken(other.0.wrapping_sub(self.0))
    }

    fn fraction_to(&self, other: &Self) -> f64 {
        self.distance_to(other).0 as f64 / 2f64.powi(64)
    }
}

impl From<DigestToken> for u64 {
    fn from(token: DigestToken) -> Self {
        token.0
    }
}

impl fmt::Display for DigestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
