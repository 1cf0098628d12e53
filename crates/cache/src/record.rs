use reader_extract::Article;
use time::UtcDateTime;

/// The current time, at the (whole second) precision records are stored with.
pub fn timestamp() -> UtcDateTime {
    let now = UtcDateTime::now();
    now.replace_nanosecond(0).unwrap_or(now)
}

/// A persisted URL together with its fetched document and extracted article.
///
/// `id` is assigned by the store on creation and never reused; its short ID
/// is derived from it on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: u64,
    /// Canonical URL, unique across the store.
    pub url: String,
    /// The fetched document, byte for byte as received (any charset).
    pub original_content: Vec<u8>,
    pub article: Article,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

impl UrlRecord {
    /// Replace everything derived from a fetch, keeping identity and
    /// creation time.
    pub fn refresh(&mut self, url: String, original_content: Vec<u8>, article: Article, now: UtcDateTime) {
        self.url = url;
        self.original_content = original_content;
        self.article = article;
        self.updated_at = now;
    }
}

/// A record that hasn't been assigned an ID yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub url: String,
    pub original_content: Vec<u8>,
    pub article: Article,
}

impl NewUrlRecord {
    pub(crate) fn into_record(self, id: u64, now: UtcDateTime) -> UrlRecord {
        UrlRecord {
            id,
            url: self.url,
            original_content: self.original_content,
            article: self.article,
            created_at: now,
            updated_at: now,
        }
    }
}
