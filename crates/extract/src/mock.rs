//! Canned extractor for testing.

use crate::error::{ErrorKind, Result};
use crate::{Article, Extractor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Extractor returning fixture articles without parsing anything.
///
/// URLs without a registered fixture get a generated article whose title is
/// the URL and whose text is the (lossily decoded) HTML input.
///
/// # Examples
///
/// ```
/// use reader_extract::{Article, Extractor, MockExtractor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let extractor = MockExtractor::default().with_article(
///     "https://example.com/a",
///     Article { title: "A".into(), ..Default::default() },
/// );
/// let article = extractor.extract("https://example.com/a", b"<html/>").await.unwrap();
/// assert_eq!(article.title, "A");
/// assert_eq!(extractor.calls(), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockExtractor {
    fixtures: HashMap<String, std::result::Result<Article, ErrorKind>>,
    calls: AtomicUsize,
}

impl MockExtractor {
    pub fn with_article(mut self, url: impl Into<String>, article: Article) -> Self {
        self.fixtures.insert(url.into(), Ok(article));
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, kind: ErrorKind) -> Self {
        self.fixtures.insert(url.into(), Err(kind));
        self
    }

    /// Number of extractions performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, url: &str, html: &[u8]) -> Result<Article> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fixtures.get(url) {
            Some(Ok(article)) => Ok(article.clone()),
            Some(Err(kind)) => Err(exn::Exn::from(kind.clone())),
            None => {
                let text = String::from_utf8_lossy(html).into_owned();
                Ok(Article {
                    title: url.to_string(),
                    content: format!("<div>{text}</div>"),
                    length: text.chars().count() as u64,
                    text_content: text,
                    ..Default::default()
                })
            },
        }
    }
}
