//! Store Error Types

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// Another record already holds this canonical URL. Callers racing on the
    /// same URL should re-read the existing record.
    #[display("a record already exists for {_0}")]
    UniqueViolation(#[error(not(source))] String),
    /// Saving a record that isn't (or is no longer) in the store.
    #[display("record not found: {_0}")]
    RecordNotFound(#[error(not(source))] u64),
    /// A random record was requested from an empty store.
    #[display("the store is empty")]
    Empty,
    /// Serialization/deserialization error.
    #[display("invalid store data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
