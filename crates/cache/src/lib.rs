//! Persistence for ingested URLs.
//!
//! Each [`UrlRecord`] holds a canonical URL (unique across the store), the
//! document fetched from it and the article extracted from that document.
//! The [`Store`] trait is what the ingestion pipeline talks to:
//! - [`Repository`] over a SQLite [`Database`] is the real thing,
//! - `MemoryStore` (feature `mock`) backs tests in other crates.

mod db;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod models;
mod record;
mod repo;
mod store;

pub use crate::db::Database;
#[cfg(any(test, feature = "mock"))]
pub use crate::memory::MemoryStore;
pub use crate::record::{NewUrlRecord, UrlRecord, timestamp};
pub use crate::repo::Repository;
pub use crate::store::{Store, StoreHandle};
