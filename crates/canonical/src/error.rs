//! Canonicalization Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A canonicalization error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for canonicalization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Cleaning itself is total; only building a rule table can fail.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A rule pattern is not a valid regular expression.
    #[display("invalid rule pattern: {_0}")]
    InvalidPattern(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
