//! URL canonicalization.
//!
//! A canonical URL is the deduplication key for stored articles: the raw URL
//! with known tracking parameters deleted and known desktop/redirect shapes
//! rewritten to one fixed form. See [`Rules`] for the exact semantics.

mod consts;
pub mod error;
mod rules;

pub use crate::rules::Rules;

/// Canonicalize a URL with the [builtin](Rules::builtin) rule table.
///
/// ```rust
/// use reader_canonical::clean;
///
/// assert_eq!(clean("http://x.example/?utm_source=foo&v=b"), "http://x.example/?v=b");
/// assert_eq!(clean("https://blog.naver.com/acct/123"), "https://m.blog.naver.com/acct/123");
/// ```
pub fn clean(url: &str) -> String {
    Rules::builtin().clean(url)
}
