use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use serde::Deserialize;

/// Readable article data extracted from a single HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub byline: String,
    /// Cleaned article HTML.
    pub content: String,
    /// Article text with all markup removed.
    pub text_content: String,
    /// Length of `text_content` in characters.
    pub length: u64,
    pub excerpt: String,
    pub site_name: String,
}

/// The JSON record printed by Mozilla Readability's `parse()`.
///
/// Readability prints `null` instead of an object when it can't find an
/// article, and any string field may itself be `null`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadabilityRecord {
    title: Option<String>,
    byline: Option<String>,
    content: Option<String>,
    text_content: Option<String>,
    length: Option<u64>,
    excerpt: Option<String>,
    site_name: Option<String>,
}

impl From<ReadabilityRecord> for Article {
    fn from(record: ReadabilityRecord) -> Self {
        let text_content = record.text_content.unwrap_or_default();
        Self {
            length: record.length.unwrap_or_else(|| text_content.chars().count() as u64),
            title: record.title.unwrap_or_default(),
            byline: record.byline.unwrap_or_default(),
            content: record.content.unwrap_or_default(),
            text_content,
            excerpt: record.excerpt.unwrap_or_default(),
            site_name: record.site_name.unwrap_or_default(),
        }
    }
}

impl Article {
    /// Parse the standard output of the readability process.
    pub fn from_readability_json(output: &[u8]) -> Result<Self> {
        serde_json::from_slice::<Option<ReadabilityRecord>>(output)
            .or_raise(|| ErrorKind::MalformedOutput)?
            .map(Article::from)
            .ok_or_raise(|| ErrorKind::Unreadable)
    }
}
