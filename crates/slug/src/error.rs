//! Slug Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A slug error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for slug operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The short ID contains a character that is not part of the alphabet.
    #[display("invalid character in short id: {_0:?}")]
    InvalidCharacter(#[error(not(source))] char),
    /// The short ID decodes to a value larger than `u64::MAX`.
    #[display("short id is out of range")]
    Overflow,
    /// The short ID is the empty string.
    #[display("short id is empty")]
    Empty,
    /// An alphabet needs at least two characters to form a numeral system.
    #[display("alphabet must contain at least 2 characters")]
    AlphabetTooShort,
    /// Every character of an alphabet must be unique.
    #[display("alphabet contains duplicate character: {_0:?}")]
    DuplicateCharacter(#[error(not(source))] char),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Decoding is pure; the same input always fails the same way.
        false
    }
}
