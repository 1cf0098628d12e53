//! SQLite-backed [`Store`].

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::UrlRow;
use crate::record::{NewUrlRecord, UrlRecord, timestamp};
use crate::store::Store;
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use sqlx::SqlitePool;
use tracing::instrument;

/// Repository for URL records in the store database.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Store for Repository {
    #[instrument(skip_all, fields(url = %record.url))]
    async fn create(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        let mut record = record.into_record(0, timestamp());
        let row = UrlRow::try_from(&record)?;
        let result = sqlx::query_scalar::<_, i64>(include_str!("../queries/insert_url.sql"))
            .bind(row.url)
            .bind(row.original_content)
            .bind(row.title)
            .bind(row.byline)
            .bind(row.content)
            .bind(row.text_content)
            .bind(row.length)
            .bind(row.excerpt)
            .bind(row.site_name)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await;
        let id = match result {
            Err(err) if is_unique_violation(&err) => {
                exn::bail!(ErrorKind::UniqueViolation(record.url))
            },
            other => other.or_raise(|| ErrorKind::Database)?,
        };
        record.id = u64::try_from(id).or_raise(|| ErrorKind::InvalidData("id"))?;
        tracing::debug!(id = record.id, "URL record created");
        Ok(record)
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        sqlx::query_as::<_, UrlRow>(include_str!("../queries/get_by_url.sql"))
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?
            .map(UrlRecord::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<UrlRecord>> {
        // Anything beyond SQLite's integer range can't have been assigned.
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        sqlx::query_as::<_, UrlRow>(include_str!("../queries/get_by_id.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?
            .map(UrlRecord::try_from)
            .transpose()
    }

    #[instrument(skip_all, fields(id = record.id, url = %record.url))]
    async fn save(&self, record: &UrlRecord) -> Result<()> {
        let row = UrlRow::try_from(record)?;
        let result = sqlx::query(include_str!("../queries/update_url.sql"))
            .bind(row.url)
            .bind(row.original_content)
            .bind(row.title)
            .bind(row.byline)
            .bind(row.content)
            .bind(row.text_content)
            .bind(row.length)
            .bind(row.excerpt)
            .bind(row.site_name)
            .bind(row.updated_at)
            .bind(row.id)
            .execute(&self.pool)
            .await;
        let done = match result {
            Err(err) if is_unique_violation(&err) => {
                exn::bail!(ErrorKind::UniqueViolation(record.url.clone()))
            },
            other => other.or_raise(|| ErrorKind::Database)?,
        };
        if done.rows_affected() == 0 {
            exn::bail!(ErrorKind::RecordNotFound(record.id));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UrlRecord>> {
        sqlx::query_as::<_, UrlRow>(include_str!("../queries/list_urls.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?
            .into_iter()
            .map(UrlRecord::try_from)
            .collect()
    }

    async fn random(&self) -> Result<UrlRecord> {
        let row = sqlx::query_as::<_, UrlRow>(include_str!("../queries/random_url.sql"))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?
            .ok_or_raise(|| ErrorKind::Empty)?;
        UrlRecord::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reader_extract::Article;

    async fn repository() -> Repository {
        Repository::from(&Database::connect_in_memory().await.unwrap())
    }

    fn new_record(url: &str) -> NewUrlRecord {
        NewUrlRecord {
            url: url.to_string(),
            original_content: format!("<html><body>{url}</body></html>").into_bytes(),
            article: Article {
                title: format!("Title of {url}"),
                text_content: url.to_string(),
                length: url.len() as u64,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = repository().await;
        let first = repo.create(new_record("https://example.com/1")).await.unwrap();
        let second = repo.create(new_record("https://example.com/2")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_created_record_round_trips() {
        let repo = repository().await;
        let created = repo.create(new_record("https://example.com/a")).await.unwrap();
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.find_by_url("https://example.com/a").await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_original_content_is_stored_as_bytes() {
        let repo = repository().await;
        let body = b"<p>\xc7\xd1\xb1\xdb</p>\x00".to_vec();
        let created = repo.create(NewUrlRecord { original_content: body.clone(), ..new_record("https://example.kr/") }).await.unwrap();
        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.original_content, body);
    }

    #[tokio::test]
    async fn test_duplicate_url_is_a_unique_violation() {
        let repo = repository().await;
        repo.create(new_record("https://example.com/a")).await.unwrap();
        let err = repo.create(new_record("https://example.com/a")).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::UniqueViolation("https://example.com/a".to_string()));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_records_are_none() {
        let repo = repository().await;
        assert_eq!(repo.find_by_id(1).await.unwrap(), None);
        assert_eq!(repo.find_by_id(u64::MAX).await.unwrap(), None);
        assert_eq!(repo.find_by_url("https://example.com/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_fields() {
        let repo = repository().await;
        let mut record = repo.create(new_record("https://example.com/a")).await.unwrap();
        let later = record.updated_at + time::Duration::hours(1);
        let article = Article { title: "Updated".to_string(), ..Default::default() };
        record.refresh("https://example.com/b".to_string(), b"<html/>".to_vec(), article, later);
        repo.save(&record).await.unwrap();

        let stored = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored, record);
        assert_eq!(stored.article.title, "Updated");
        assert_eq!(repo.find_by_url("https://example.com/a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_onto_taken_url_is_a_unique_violation() {
        let repo = repository().await;
        repo.create(new_record("https://example.com/a")).await.unwrap();
        let mut record = repo.create(new_record("https://example.com/b")).await.unwrap();
        record.url = "https://example.com/a".to_string();
        let err = repo.save(&record).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::UniqueViolation("https://example.com/a".to_string()));
    }

    #[tokio::test]
    async fn test_save_unknown_record() {
        let repo = repository().await;
        let mut record = repo.create(new_record("https://example.com/a")).await.unwrap();
        record.id = 99;
        let err = repo.save(&record).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::RecordNotFound(99));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let repo = repository().await;
        for n in 0..3 {
            repo.create(new_record(&format!("https://example.com/{n}"))).await.unwrap();
        }
        let ids: Vec<u64> = repo.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_random() {
        let repo = repository().await;
        assert_eq!(&*repo.random().await.unwrap_err(), &ErrorKind::Empty);
        let record = repo.create(new_record("https://example.com/a")).await.unwrap();
        assert_eq!(repo.random().await.unwrap(), record);
    }
}
