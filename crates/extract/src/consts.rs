use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(OG_TITLE_SELECTOR, "meta[property='og:title']");
selector!(TITLE_SELECTOR, "head title");
selector!(OG_SITE_NAME_SELECTOR, "meta[property='og:site_name']");
selector!(AUTHOR_SELECTOR, "meta[name='author'], meta[property='article:author']");
selector!(OG_DESCRIPTION_SELECTOR, "meta[property='og:description']");
selector!(DESCRIPTION_SELECTOR, "meta[name='description']");
// Most specific first; the first non-empty match is the article body.
selector!(ARTICLE_SELECTOR, "article");
selector!(MAIN_SELECTOR, "main, [role='main']");
selector!(BODY_SELECTOR, "body");
selector!(PARAGRAPH_SELECTOR, "p");

/// Excerpt length (in characters) when the page declares no description.
pub(crate) const EXCERPT_CHARS: usize = 200;
