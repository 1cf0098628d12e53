use crate::error::{Error, ErrorKind};
use crate::record::UrlRecord;
use exn::ResultExt;
use reader_extract::Article;
use time::UtcDateTime;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UrlRow {
    pub(crate) id: i64,
    pub(crate) url: String,
    pub(crate) original_content: Vec<u8>,
    pub(crate) title: String,
    pub(crate) byline: String,
    pub(crate) content: String,
    pub(crate) text_content: String,
    pub(crate) length: i64,
    pub(crate) excerpt: String,
    pub(crate) site_name: String,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl TryFrom<&UrlRecord> for UrlRow {
    type Error = Error;
    fn try_from(record: &UrlRecord) -> Result<Self, Self::Error> {
        let article = &record.article;
        Ok(Self {
            id: i64::try_from(record.id).or_raise(|| ErrorKind::InvalidData("id"))?,
            url: record.url.clone(),
            original_content: record.original_content.clone(),
            title: article.title.clone(),
            byline: article.byline.clone(),
            content: article.content.clone(),
            text_content: article.text_content.clone(),
            length: i64::try_from(article.length).or_raise(|| ErrorKind::InvalidData("length"))?,
            excerpt: article.excerpt.clone(),
            site_name: article.site_name.clone(),
            created_at: record.created_at.unix_timestamp(),
            updated_at: record.updated_at.unix_timestamp(),
        })
    }
}

impl TryFrom<UrlRow> for UrlRecord {
    type Error = Error;
    fn try_from(row: UrlRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: u64::try_from(row.id).or_raise(|| ErrorKind::InvalidData("id"))?,
            url: row.url,
            original_content: row.original_content,
            article: Article {
                title: row.title,
                byline: row.byline,
                content: row.content,
                text_content: row.text_content,
                length: u64::try_from(row.length).or_raise(|| ErrorKind::InvalidData("length"))?,
                excerpt: row.excerpt,
                site_name: row.site_name,
            },
            created_at: UtcDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("creation date"))?,
            updated_at: UtcDateTime::from_unix_timestamp(row.updated_at)
                .or_raise(|| ErrorKind::InvalidData("update date"))?,
        })
    }
}
