//! Ingestion Error Types
//!
//! Collaborator failures (store, fetcher, extractor, codec) are raised as
//! children of one of these kinds, so the tree keeps the underlying cause
//! while callers only ever match on what to do about it.

use derive_more::{Display, Error};

/// An ingestion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: an empty URL or an identifier that is neither a
    /// number nor a short ID.
    #[display("invalid input: {_0}")]
    Validation(#[error(not(source))] String),
    #[display("no record for {_0}")]
    NotFound(#[error(not(source))] String),
    /// Transport failure (`status` is `None`) or a non-2xx response.
    #[display("failed to fetch {url} (status: {status:?})")]
    Fetch { url: String, status: Option<u16> },
    #[display("failed to extract an article from {_0}")]
    Extraction(#[error(not(source))] String),
    #[display("failed to persist record")]
    Persistence,
    #[display("operation cancelled")]
    Cancelled,
    #[display("invalid fetcher configuration")]
    Configuration,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { status: None, .. } => true,
            Self::Fetch { status: Some(status), .. } => *status >= 500 || *status == 429,
            Self::Persistence => true,
            _ => false,
        }
    }

    /// HTTP-style status for user-facing layers.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Fetch { .. } => 502,
            _ => 500,
        }
    }
}
