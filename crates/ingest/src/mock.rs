//! Scripted fetcher for testing.

use crate::error::{ErrorKind, Result};
use crate::fetch::{Fetcher, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Barrier, Mutex};

#[derive(Debug, Clone)]
enum Page {
    Response(Response),
    Unreachable,
    Hang,
}

/// Fetcher serving scripted pages.
///
/// URLs without a scripted page answer `200` with a small HTML document
/// mentioning the URL. Every request is recorded, and an optional barrier
/// holds each request until the expected number of callers are fetching at
/// the same time.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: HashMap<String, Page>,
    barrier: Option<Arc<Barrier>>,
    requests: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn with_page(mut self, url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.into(), Page::Response(Response { status, body: body.into() }));
        self
    }

    /// Requests to `url` fail as if the host was unreachable.
    pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Page::Unreachable);
        self
    }

    /// Requests to `url` never complete.
    pub fn with_hang(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Page::Hang);
        self
    }

    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(url.to_string());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        match self.pages.get(url) {
            Some(Page::Response(response)) => Ok(response.clone()),
            Some(Page::Unreachable) => exn::bail!(ErrorKind::Fetch { url: url.to_string(), status: None }),
            Some(Page::Hang) => std::future::pending().await,
            None => Ok(Response { status: 200, body: format!("<html><body><p>{url}</p></body></html>").into_bytes() }),
        }
    }
}
