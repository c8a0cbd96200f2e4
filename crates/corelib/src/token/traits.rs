use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A position on the ring.
///
/// Positions are totally ordered and the ring is walked in ascending order,
/// wrapping from the largest position back to `zero()`.
pub trait Token: Clone + Ord + Hash + Send + Sync + Debug + Display + 'static {
    fn zero() -> Self;
    fn max() -> Self;
    fn is_zero(&self) -> bool;
    fn is_max(&self) -> bool;
    /// Clockwise distance from `self` to `other`, wrapping past `max()`.
    fn distance_to(&self, other: &Self) -> Self;
    /// `distance_to` as a share of the full ring, in `[0, 1)`.
    fn fraction_to(&self, other: &Self) -> f64;
}
