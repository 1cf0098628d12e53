//! In-memory store for testing.

use crate::error::{ErrorKind, Result};
use crate::record::{NewUrlRecord, UrlRecord, timestamp};
use crate::store::Store;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, RandomState};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    last_id: u64,
    records: BTreeMap<u64, UrlRecord>,
    ids_by_url: HashMap<String, u64>,
}

/// A [`Store`] keeping records in a map, with the same uniqueness and ID
/// guarantees as the SQLite repository.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        // Check and insert under one write lock.
        let mut inner = self.inner.write().await;
        if inner.ids_by_url.contains_key(&record.url) {
            exn::bail!(ErrorKind::UniqueViolation(record.url));
        }
        inner.last_id += 1;
        let record = record.into_record(inner.last_id, timestamp());
        inner.ids_by_url.insert(record.url.clone(), record.id);
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.ids_by_url.get(url).and_then(|id| inner.records.get(id)).cloned())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<UrlRecord>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn save(&self, record: &UrlRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        let Some(previous) = inner.records.get(&record.id).map(|r| r.url.clone()) else {
            exn::bail!(ErrorKind::RecordNotFound(record.id));
        };
        if previous != record.url {
            if inner.ids_by_url.contains_key(&record.url) {
                exn::bail!(ErrorKind::UniqueViolation(record.url.clone()));
            }
            inner.ids_by_url.remove(&previous);
            inner.ids_by_url.insert(record.url.clone(), record.id);
        }
        inner.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UrlRecord>> {
        Ok(self.inner.read().await.records.values().cloned().collect())
    }

    async fn random(&self) -> Result<UrlRecord> {
        let inner = self.inner.read().await;
        if inner.records.is_empty() {
            exn::bail!(ErrorKind::Empty);
        }
        // Randomly seeded hasher, good enough to pick a test record.
        let index = RandomState::new().hash_one(inner.last_id) as usize % inner.records.len();
        inner.records.values().nth(index).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::Empty))
    }
}
