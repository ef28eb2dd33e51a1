//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree and styling invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed date (expected YYYY-MM-DD): {0:?}")]
    MalformedDate(String),

    #[error("invalid tree at {path}: {message}")]
    InvalidTree { path: String, message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
