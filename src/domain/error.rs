//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent contract violations of the tag parser.
/// These are independent of I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("not a doc comment: {0}")]
    InvalidFormat(String),

    #[error("nested names are not supported by single-level accessors: {0}")]
    InvalidName(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
