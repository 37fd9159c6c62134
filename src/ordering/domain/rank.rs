//! The dense 1-based rank value.

use super::OrderingDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an item within its container, starting at 1.
///
/// # Examples
///
/// ```
/// use corkboard::ordering::domain::Rank;
///
/// let rank = Rank::FIRST;
/// assert_eq!(rank.value(), 1);
/// assert_eq!(rank.next().value(), 2);
/// assert!(Rank::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Rank(u64);

impl Rank {
    /// The head of every container.
    pub const FIRST: Self = Self(1);

    /// Creates a validated rank.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingDomainError::InvalidRank`] when the value is zero.
    pub const fn new(value: u64) -> Result<Self, OrderingDomainError> {
        if value == 0 {
            return Err(OrderingDomainError::InvalidRank(value));
        }
        Ok(Self(value))
    }

    /// Returns the rank held by the element at a zero-based index.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let value = u64::try_from(index).map_or(u64::MAX, |idx| idx.saturating_add(1));
        Self(value)
    }

    /// Returns the underlying rank value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the rank directly after this one.
    ///
    /// Saturates at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u64> for Rank {
    type Error = OrderingDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rank> for u64 {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
