use crate::error::Result;
use crate::record::{NewUrlRecord, UrlRecord};
use async_trait::async_trait;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn Store>;

/// Persistence for URL records.
///
/// The canonical URL is unique: [`Store::create`] fails with
/// [`ErrorKind::UniqueViolation`](crate::error::ErrorKind::UniqueViolation)
/// when it is already taken, and implementations must guarantee that holds
/// for concurrent callers too. That check is the only thing standing between
/// two racing ingestions of the same URL and a duplicate record.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a new record, assigning its ID and timestamps.
    async fn create(&self, record: NewUrlRecord) -> Result<UrlRecord>;

    async fn find_by_url(&self, url: &str) -> Result<Option<UrlRecord>>;

    async fn find_by_id(&self, id: u64) -> Result<Option<UrlRecord>>;

    /// Overwrite an existing record (matched by ID) with `record`.
    async fn save(&self, record: &UrlRecord) -> Result<()>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<UrlRecord>>;

    /// Any one record.
    async fn random(&self) -> Result<UrlRecord>;
}
