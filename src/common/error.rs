//! Error types for the B-tree index.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All errors a caller can observe from the index.
///
/// Searching for or deleting an absent key is a normal outcome, not an
/// error. A broken structural invariant is a bug and is reported
/// separately by [`crate::index::btree::InvariantViolation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested order is below the supported minimum.
    ///
    /// Returned at construction time; no tree is created.
    #[error("Invalid order {order}: must be at least {min}")]
    InvalidOrder { order: usize, min: usize },

    /// The key being inserted is already present.
    ///
    /// The tree is left unmodified.
    #[error("Duplicate key")]
    DuplicateKey,
}
