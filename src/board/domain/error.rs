//! Error types for board domain validation.

use thiserror::Error;

/// Errors returned while constructing board domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The title exceeds the storage limit.
    #[error("title exceeds {max} character limit ({actual} characters)")]
    TitleTooLong {
        /// Maximum number of characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },
}
