//! Native extraction from document metadata and markup.
//!
//! Much less thorough than Readability: it trusts OpenGraph/meta tags for
//! the title, byline and excerpt, and takes the first of `<article>`,
//! `<main>` or `<body>` with visible text as the article body. Useful when
//! node.js isn't available.

use crate::error::{ErrorKind, Result};
use crate::{Article, Extractor, consts};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::instrument;

#[derive(Debug, Default, Clone, Copy)]
pub struct MetaExtractor;

impl MetaExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract an article from raw HTML bytes. Invalid UTF-8 sequences are
    /// replaced with U+FFFD.
    pub fn parse(&self, html: &[u8]) -> Result<Article> {
        let document = Html::parse_document(&String::from_utf8_lossy(html));
        let Some(body) = [&*consts::ARTICLE_SELECTOR, &*consts::MAIN_SELECTOR, &*consts::BODY_SELECTOR]
            .into_iter()
            .filter_map(|selector| document.select(selector).next())
            .find(|element| !visible_text(*element).is_empty())
        else {
            exn::bail!(ErrorKind::Unreadable);
        };
        let text_content = visible_text(body);
        let excerpt = meta_content(&document, &consts::OG_DESCRIPTION_SELECTOR)
            .or_else(|| meta_content(&document, &consts::DESCRIPTION_SELECTOR))
            .or_else(|| {
                body.select(&consts::PARAGRAPH_SELECTOR)
                    .map(visible_text)
                    .find(|text| !text.is_empty())
                    .map(|text| text.chars().take(consts::EXCERPT_CHARS).collect())
            })
            .unwrap_or_default();
        Ok(Article {
            title: meta_content(&document, &consts::OG_TITLE_SELECTOR)
                .or_else(|| document.select(&consts::TITLE_SELECTOR).next().map(visible_text))
                .unwrap_or_default(),
            byline: meta_content(&document, &consts::AUTHOR_SELECTOR).unwrap_or_default(),
            content: body.inner_html(),
            length: text_content.chars().count() as u64,
            text_content,
            excerpt,
            site_name: meta_content(&document, &consts::OG_SITE_NAME_SELECTOR).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl Extractor for MetaExtractor {
    #[instrument(skip(self, html), fields(html_size = html.len()))]
    async fn extract(&self, _url: &str, html: &[u8]) -> Result<Article> {
        self.parse(html)
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

/// Text of an element with runs of whitespace collapsed, skipping the
/// contents of `<script>`, `<style>` and `<noscript>`.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut words = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| matches!(e.name(), "script" | "style" | "noscript")))
            .unwrap_or(false);
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}
