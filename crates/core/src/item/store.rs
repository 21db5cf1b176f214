//! Item storage trait and error type.

use async_trait::async_trait;
use thiserror::Error;

use super::Item;

/// Error type for item storage operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No item with this id.
    #[error("Item not found: {0}")]
    NotFound(i64),

    /// The write was rejected because it conflicts with stored data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend failure.
    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for item storage backends.
///
/// Implementations must be safe to call from many tasks at once; the bulk
/// processor issues lookups and saves concurrently. Blocking backends should
/// move their I/O off the runtime workers (see `SqliteItemStore`).
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// List every stored item.
    async fn find_all(&self) -> Result<Vec<Item>, StoreError>;

    /// List the ids of every stored item.
    async fn find_all_ids(&self) -> Result<Vec<i64>, StoreError>;

    /// Get an item by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Item>, StoreError>;

    /// Persist an item.
    ///
    /// Inserts and assigns an id when `item.id` is `None`, otherwise inserts
    /// or replaces the row with that id. Returns the persisted form.
    async fn save(&self, item: Item) -> Result<Item, StoreError>;

    /// Delete an item. Fails with [`StoreError::NotFound`] if nothing was deleted.
    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;
}
