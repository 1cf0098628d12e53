//! URL ingestion.
//!
//! [`Reader`] ties the pieces together: a raw URL is canonicalized, looked
//! up in the store, and only on a miss fetched (through a [`Fetcher`]) and
//! turned into an article (through an extractor) before being stored. Stored
//! records are addressed by their numeric ID or its short form.

pub mod error;
mod fetch;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod reader;

pub use crate::fetch::{Fetcher, FetcherHandle, HttpFetcher, MAX_REDIRECTS, Response};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockFetcher;
pub use crate::reader::Reader;
