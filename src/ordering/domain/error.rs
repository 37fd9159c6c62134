//! Error types for ordering domain validation.

use thiserror::Error;

/// Errors returned while constructing ordering domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingDomainError {
    /// An identifier is not a valid UUID.
    #[error("invalid identifier '{0}', expected a UUID")]
    InvalidIdentifier(String),

    /// A rank is zero; ranks are 1-based.
    #[error("invalid rank {0}, expected a positive integer")]
    InvalidRank(u64),
}
