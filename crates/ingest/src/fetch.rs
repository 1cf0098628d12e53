//! Document retrieval.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

pub type FetcherHandle = Arc<dyn Fetcher>;

/// A fetched document. Non-2xx responses are returned rather than raised so
/// the caller decides what counts as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves the document at a URL, following redirects.
///
/// Transport failures are [`ErrorKind::Fetch`] with no status. Dropping the
/// returned future aborts the request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<Response>;
}

/// [`Fetcher`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Configuration)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<Response> {
        let failed = || ErrorKind::Fetch { url: url.to_string(), status: None };
        let response = self.client.get(url).send().await.or_raise(failed)?;
        let status = response.status();
        if !status.is_success() {
            tracing::info!(status = status.as_u16(), "Unsuccessful response");
            // The error page isn't worth downloading.
            return Ok(Response { status: status.as_u16(), body: Vec::new() });
        }
        if response.url().as_str() != url {
            tracing::debug!(final_url = %response.url(), "Followed redirects");
        }
        let body = response.bytes().await.or_raise(failed)?;
        tracing::debug!(status = status.as_u16(), size = body.len(), "Document fetched");
        Ok(Response { status: status.as_u16(), body: body.to_vec() })
    }
}
