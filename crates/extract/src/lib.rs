//! Readable article extraction.
//!
//! Extraction is a capability injected into the ingestion pipeline through
//! the [`Extractor`] trait:
//! - [`ProcessExtractor`] hands the document to Mozilla Readability running
//!   under node.js (the production implementation),
//! - [`MetaExtractor`] is a native fallback working from page metadata,
//! - `MockExtractor` (feature `mock`) returns canned fixtures for tests.

mod article;
mod assets;
mod consts;
pub mod error;
mod meta;
#[cfg(feature = "mock")]
mod mock;
mod process;

pub use crate::article::Article;
use crate::error::Result;
pub use crate::meta::MetaExtractor;
#[cfg(feature = "mock")]
pub use crate::mock::MockExtractor;
pub use crate::process::ProcessExtractor;
use async_trait::async_trait;
use std::sync::Arc;

pub type ExtractorHandle = Arc<dyn Extractor>;

/// Turns a raw HTML document into structured article data.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the readable article from `html`, which was fetched from
    /// `url` (used to resolve relative links).
    ///
    /// Implementations must stop their work when the returned future is
    /// dropped; that is how callers cancel an extraction.
    async fn extract(&self, url: &str, html: &[u8]) -> Result<Article>;
}
