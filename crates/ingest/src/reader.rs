//! The ingestion pipeline.

use crate::error::{ErrorKind, Result};
use crate::fetch::FetcherHandle;
use exn::{OptionExt, ResultExt};
use reader_cache::error::ErrorKind as StoreErrorKind;
use reader_cache::{NewUrlRecord, StoreHandle, UrlRecord};
use reader_canonical::Rules;
use reader_extract::{Article, ExtractorHandle};
use reader_slug::Shortener;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Turns URLs into stored, readable records.
///
/// Every URL is canonicalized first, and the canonical form is what gets
/// fetched and stored: adding a URL that differs from a known one only by
/// tracking parameters returns the known record without any network access.
///
/// There is no locking here. Two callers adding the same unseen URL at the
/// same time both fetch and extract it, the store's uniqueness constraint
/// lets exactly one of them create the record, and the other returns it.
pub struct Reader {
    store: StoreHandle,
    fetcher: FetcherHandle,
    extractor: ExtractorHandle,
    rules: &'static Rules,
    shortener: Shortener,
}

impl Reader {
    pub fn new(store: StoreHandle, fetcher: FetcherHandle, extractor: ExtractorHandle) -> Self {
        Self { store, fetcher, extractor, rules: Rules::builtin(), shortener: Shortener::default() }
    }

    /// Canonicalize with another compiled table instead of the builtin one.
    pub fn with_rules(mut self, rules: &'static Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_shortener(mut self, shortener: Shortener) -> Self {
        self.shortener = shortener;
        self
    }

    pub fn shortener(&self) -> &Shortener {
        &self.shortener
    }

    pub fn short_id(&self, record: &UrlRecord) -> String {
        self.shortener.encode(record.id)
    }

    pub fn canonicalize(&self, url: &str) -> String {
        self.rules.clean(url)
    }

    /// Parse a record identifier: all-digit input is a numeric ID, anything
    /// else a short ID.
    pub fn resolve(&self, id_or_short: &str) -> Result<u64> {
        if id_or_short.is_empty() {
            exn::bail!(ErrorKind::Validation("empty identifier".to_string()));
        }
        if id_or_short.bytes().all(|b| b.is_ascii_digit()) {
            return id_or_short
                .parse::<u64>()
                .or_raise(|| ErrorKind::Validation(format!("record ID out of range: {id_or_short}")));
        }
        self.shortener
            .decode(id_or_short)
            .or_raise(|| ErrorKind::Validation(format!("invalid short ID: {id_or_short}")))
    }

    /// Return the record for `raw`'s canonical URL, ingesting it first if it
    /// isn't stored yet. A stored record is returned as is, never refreshed.
    #[instrument(skip(self, cancel))]
    pub async fn add_url(&self, cancel: &CancellationToken, raw: &str) -> Result<UrlRecord> {
        if raw.trim().is_empty() {
            exn::bail!(ErrorKind::Validation("empty URL".to_string()));
        }
        let url = self.canonicalize(raw);
        if let Some(record) = self.find_by_url(&url).await? {
            tracing::debug!(id = record.id, "URL already stored");
            return Ok(record);
        }
        let (original_content, article) = self.fetch_and_extract(cancel, &url).await?;
        let new = NewUrlRecord { url: url.clone(), original_content, article };
        match self.store.create(new).await {
            Ok(record) => {
                tracing::info!(id = record.id, url = %record.url, "URL added");
                Ok(record)
            },
            Err(err) if matches!(&*err, StoreErrorKind::UniqueViolation(_)) => {
                tracing::debug!("URL was stored concurrently, using the existing record");
                self.find_by_url(&url).await?.ok_or_raise(|| ErrorKind::Persistence)
            },
            other => other.or_raise(|| ErrorKind::Persistence),
        }
    }

    /// Fetch and extract a stored record again, overwriting its URL, content
    /// and update time in place. Nothing is written unless every step
    /// succeeds.
    #[instrument(skip(self, cancel))]
    pub async fn update_url(&self, cancel: &CancellationToken, id_or_short: &str) -> Result<UrlRecord> {
        let mut record = self.view(id_or_short).await?;
        // Stored URLs predating a rule change are brought up to date.
        let url = self.canonicalize(&record.url);
        let (original_content, article) = self.fetch_and_extract(cancel, &url).await?;
        record.refresh(url, original_content, article, reader_cache::timestamp());
        self.store.save(&record).await.or_raise(|| ErrorKind::Persistence)?;
        tracing::info!(id = record.id, url = %record.url, "URL updated");
        Ok(record)
    }

    /// Look up a record by numeric or short ID.
    pub async fn view(&self, id_or_short: &str) -> Result<UrlRecord> {
        let id = self.resolve(id_or_short)?;
        self.store
            .find_by_id(id)
            .await
            .or_raise(|| ErrorKind::Persistence)?
            .ok_or_raise(|| ErrorKind::NotFound(id_or_short.to_string()))
    }

    /// All records, oldest first.
    pub async fn list(&self) -> Result<Vec<UrlRecord>> {
        self.store.list().await.or_raise(|| ErrorKind::Persistence)
    }

    pub async fn random(&self) -> Result<UrlRecord> {
        match self.store.random().await {
            Err(err) if matches!(&*err, StoreErrorKind::Empty) => {
                exn::bail!(ErrorKind::NotFound("any record".to_string()))
            },
            other => other.or_raise(|| ErrorKind::Persistence),
        }
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        self.store.find_by_url(url).await.or_raise(|| ErrorKind::Persistence)
    }

    /// One fetch and one extraction attempt, both abandoned on cancellation.
    async fn fetch_and_extract(&self, cancel: &CancellationToken, url: &str) -> Result<(Vec<u8>, Article)> {
        let response = until_cancelled(cancel, self.fetcher.get(url)).await?;
        if !response.is_success() {
            exn::bail!(ErrorKind::Fetch { url: url.to_string(), status: Some(response.status) });
        }
        let extraction = self.extractor.extract(url, &response.body);
        let article = until_cancelled(cancel, async { extraction.await.or_raise(|| ErrorKind::Extraction(url.to_string())) })
            .await?;
        Ok((response.body, article))
    }
}

async fn until_cancelled<T>(cancel: &CancellationToken, work: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!("Cancelled");
            exn::bail!(ErrorKind::Cancelled)
        },
        result = work => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockFetcher;
    use reader_cache::{Database, MemoryStore, Repository, Store};
    use reader_extract::MockExtractor;
    use reader_extract::error::ErrorKind as ExtractErrorKind;
    use rstest::rstest;
    use std::sync::{Arc, LazyLock};
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct Harness {
        store: Arc<MemoryStore>,
        fetcher: Arc<MockFetcher>,
        extractor: Arc<MockExtractor>,
        reader: Reader,
    }

    fn harness(fetcher: MockFetcher, extractor: MockExtractor) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let fetcher = Arc::new(fetcher);
        let extractor = Arc::new(extractor);
        let reader = Reader::new(store.clone(), fetcher.clone(), extractor.clone());
        Harness { store, fetcher, extractor, reader }
    }

    fn seed(url: &str, title: &str) -> NewUrlRecord {
        NewUrlRecord {
            url: url.to_string(),
            original_content: b"<html>old</html>".to_vec(),
            article: Article { title: title.to_string(), ..Default::default() },
        }
    }

    #[tokio::test]
    async fn test_add_stores_canonical_url_and_article() {
        let article = Article { title: "Post".to_string(), text_content: "Body".to_string(), length: 4, ..Default::default() };
        let h = harness(
            MockFetcher::default().with_page("https://example.com/post", 200, "<html>post</html>"),
            MockExtractor::default().with_article("https://example.com/post", article.clone()),
        );
        let record = h.reader.add_url(&CancellationToken::new(), "https://example.com/post?utm_source=feed").await.unwrap();
        assert_eq!(record.url, "https://example.com/post?");
        // The canonical form is what gets fetched, so the fixture above isn't hit.
        assert_eq!(h.fetcher.requests().await, vec!["https://example.com/post?".to_string()]);

        let record = h.reader.add_url(&CancellationToken::new(), "https://example.com/post").await.unwrap();
        assert_eq!(record.url, "https://example.com/post");
        assert_eq!(record.article, article);
        assert_eq!(record.original_content, b"<html>post</html>");
        assert_eq!(h.store.find_by_id(record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_stored_verbatim() {
        // "한글" in EUC-KR.
        let body: &[u8] = b"<html><body><p>\xc7\xd1\xb1\xdb</p></body></html>";
        let h = harness(MockFetcher::default().with_page("https://news.example.kr/1", 200, body), MockExtractor::default());
        let record = h.reader.add_url(&CancellationToken::new(), "https://news.example.kr/1").await.unwrap();
        assert_eq!(record.original_content, body);
        let stored = h.store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.original_content, body);
    }

    #[tokio::test]
    async fn test_tracking_parameters_resolve_to_one_record() {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let cancel = CancellationToken::new();
        let first = h.reader.add_url(&cancel, "https://x.example/?fbclid=abc&v=b").await.unwrap();
        let second = h.reader.add_url(&cancel, "https://x.example/?utm_source=foo&v=b").await.unwrap();
        let third = h.reader.add_url(&cancel, "https://x.example/?v=b").await.unwrap();
        assert_eq!(first.url, "https://x.example/?v=b");
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, third.id);
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_known_url_is_not_fetched_again() {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let cancel = CancellationToken::new();
        let first = h.reader.add_url(&cancel, "https://example.com/a").await.unwrap();
        let second = h.reader.add_url(&cancel, "https://example.com/a").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.extractor.calls(), 1);
    }

    #[rstest]
    #[case(404)]
    #[case(500)]
    #[case(301)]
    #[tokio::test]
    async fn test_unsuccessful_status_is_a_fetch_error(#[case] status: u16) {
        let h = harness(MockFetcher::default().with_page("https://example.com/a", status, ""), MockExtractor::default());
        let err = h.reader.add_url(&CancellationToken::new(), "https://example.com/a").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Fetch { url: "https://example.com/a".to_string(), status: Some(status) });
        assert_eq!(h.extractor.calls(), 0);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_fetch_error() {
        let h = harness(MockFetcher::default().with_unreachable("https://example.com/a"), MockExtractor::default());
        let err = h.reader.add_url(&CancellationToken::new(), "https://example.com/a").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Fetch { url: "https://example.com/a".to_string(), status: None });
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_extraction_failure() {
        let h = harness(
            MockFetcher::default(),
            MockExtractor::default().with_failure("https://example.com/a", ExtractErrorKind::Unreadable),
        );
        let err = h.reader.add_url(&CancellationToken::new(), "https://example.com/a").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Extraction("https://example.com/a".to_string()));
        assert_eq!(h.fetcher.calls(), 1);
        assert!(h.store.is_empty().await);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn test_empty_url_is_rejected(#[case] raw: &str) {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let err = h.reader.add_url(&CancellationToken::new(), raw).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Validation(_)));
        assert_eq!(h.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_adds_converge_on_one_record() {
        let db = Database::connect_in_memory().await.unwrap();
        let store = Arc::new(Repository::from(&db));
        // Both callers are held at the fetch until the other one has missed
        // the lookup too, forcing the race onto the insert.
        let fetcher = Arc::new(MockFetcher::default().with_barrier(Arc::new(Barrier::new(2))));
        let reader = Reader::new(store.clone(), fetcher.clone(), Arc::new(MockExtractor::default()));
        let cancel = CancellationToken::new();

        let (a, b) = tokio::join!(
            reader.add_url(&cancel, "https://example.com/race?utm_campaign=a"),
            reader.add_url(&cancel, "https://example.com/race?utm_campaign=b"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(store.list().await.unwrap().len(), 1);
        db.close().await;
    }

    #[rstest]
    #[case("99")]
    #[case("Jr")]
    #[tokio::test]
    async fn test_update_unknown_record(#[case] identifier: &str) {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        h.store.create(seed("https://example.com/a", "A")).await.unwrap();
        let before = h.store.list().await.unwrap();

        let err = h.reader.update_url(&CancellationToken::new(), identifier).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::NotFound(identifier.to_string()));
        assert_eq!(h.store.list().await.unwrap(), before);
        assert_eq!(h.fetcher.calls(), 0);
    }

    #[rstest]
    #[case("not*valid")]
    #[case("18446744073709551616")]
    #[case("")]
    #[tokio::test]
    async fn test_update_invalid_identifier(#[case] identifier: &str) {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let err = h.reader.update_url(&CancellationToken::new(), identifier).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_refreshes_in_place() {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let legacy = h.store.create(seed("https://blog.naver.com/acct/123", "Old")).await.unwrap();
        let short = h.reader.short_id(&legacy);

        let updated = h.reader.update_url(&CancellationToken::new(), &short).await.unwrap();
        assert_eq!(updated.id, legacy.id);
        assert_eq!(updated.created_at, legacy.created_at);
        assert!(updated.updated_at >= legacy.updated_at);
        assert_eq!(updated.url, "https://m.blog.naver.com/acct/123");
        assert_eq!(updated.article.title, "https://m.blog.naver.com/acct/123");
        assert_eq!(updated.original_content, b"<html><body><p>https://m.blog.naver.com/acct/123</p></body></html>");
        assert_eq!(h.fetcher.requests().await, vec!["https://m.blog.naver.com/acct/123".to_string()]);
        assert_eq!(h.store.find_by_id(legacy.id).await.unwrap(), Some(updated));
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_untouched() {
        let h = harness(MockFetcher::default().with_page("https://example.com/a", 503, ""), MockExtractor::default());
        let record = h.store.create(seed("https://example.com/a", "A")).await.unwrap();
        let err = h.reader.update_url(&CancellationToken::new(), &record.id.to_string()).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Fetch { url: "https://example.com/a".to_string(), status: Some(503) });
        assert_eq!(h.store.find_by_id(record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = h.reader.add_url(&cancel, "https://example.com/a").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Cancelled);
        assert_eq!(h.fetcher.calls(), 0);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancelled_while_fetching() {
        let h = harness(MockFetcher::default().with_hang("https://example.com/slow"), MockExtractor::default());
        let cancel = CancellationToken::new();
        let (result, ()) = tokio::join!(h.reader.add_url(&cancel, "https://example.com/slow"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
        assert_eq!(&*result.unwrap_err(), &ErrorKind::Cancelled);
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.extractor.calls(), 0);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_view_by_either_identifier() {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let record = h.reader.add_url(&CancellationToken::new(), "https://example.com/a").await.unwrap();
        assert_eq!(h.reader.view("1").await.unwrap(), record);
        assert_eq!(h.reader.view(&h.reader.short_id(&record)).await.unwrap(), record);
        assert_eq!(h.reader.short_id(&record), "J");
    }

    #[tokio::test]
    async fn test_list_and_random() {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let err = h.reader.random().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));

        let cancel = CancellationToken::new();
        let a = h.reader.add_url(&cancel, "https://example.com/a").await.unwrap();
        let b = h.reader.add_url(&cancel, "https://example.com/b").await.unwrap();
        assert_eq!(h.reader.list().await.unwrap(), vec![a.clone(), b.clone()]);
        let picked = h.reader.random().await.unwrap();
        assert!(picked == a || picked == b);
    }

    #[tokio::test]
    async fn test_custom_rules_define_the_canonical_url() {
        static RULES: LazyLock<Rules> = LazyLock::new(|| Rules::new(["session=[0-9]+&?"], [] as [(&str, &str); 0]).unwrap());
        let h = harness(MockFetcher::default(), MockExtractor::default());
        let reader = Reader::new(h.store.clone(), h.fetcher.clone(), h.extractor.clone()).with_rules(&RULES);
        let cancel = CancellationToken::new();
        let a = reader.add_url(&cancel, "https://example.com/?session=1&utm_source=x").await.unwrap();
        let b = reader.add_url(&cancel, "https://example.com/?session=2&utm_source=x").await.unwrap();
        assert_eq!(a.url, "https://example.com/?utm_source=x");
        assert_eq!(a.id, b.id);
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[rstest]
    #[case("0", 0)]
    #[case("007", 7)]
    #[case("k", 0)]
    #[case("Jk", 64)]
    #[case("18446744073709551615", u64::MAX)]
    fn test_resolve(#[case] identifier: &str, #[case] id: u64) {
        let h = harness(MockFetcher::default(), MockExtractor::default());
        assert_eq!(h.reader.resolve(identifier).unwrap(), id);
    }
}
