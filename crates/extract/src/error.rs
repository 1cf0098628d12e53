//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("node.js not detected on your system")]
    NodeNotFound,
    /// Embedded script was not loadable.
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    #[display("could not start the extractor process")]
    Spawn,
    /// The extractor process exited with a non-zero exit code.
    /// If the code is `-1`, the process was killed by a signal.
    #[display("extractor exited with code: {_0}")]
    ProcessFailed(#[error(not(source))] i32),
    /// The extractor produced output that is not a valid article record.
    #[display("malformed extractor output")]
    MalformedOutput,
    /// The document was parsed, but no readable article was found in it.
    #[display("no readable content found")]
    Unreadable,
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Spawn | Self::Io)
    }
}
