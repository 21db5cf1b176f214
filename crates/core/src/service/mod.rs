//! CRUD facade over the item store and the bulk processor.
//!
//! Maps storage outcomes onto the results callers care about: found, not
//! found, conflict, invalid input.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::item::{Item, ItemStore, StoreError};
use crate::processor::{ItemProcessor, ProcessError, ProcessOutcome};

/// Error type for service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No item with this id.
    #[error("Item not found: {0}")]
    NotFound(i64),

    /// The write conflicts with stored data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The submitted item is invalid.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Storage failure.
    #[error(transparent)]
    Store(StoreError),

    /// A processing run failed.
    #[error(transparent)]
    Processing(#[from] ProcessError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

/// Item operations exposed to transports.
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    processor: Arc<ItemProcessor>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, processor: Arc<ItemProcessor>) -> Self {
        Self { store, processor }
    }

    pub fn processor(&self) -> &ItemProcessor {
        &self.processor
    }

    /// List every item.
    pub async fn list_all(&self) -> Result<Vec<Item>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    /// Get an item by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Item>, ServiceError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Create an item. Any id on the submitted item is ignored.
    pub async fn create(&self, mut item: Item) -> Result<Item, ServiceError> {
        item.validate().map_err(ServiceError::Validation)?;
        item.id = None;

        let saved = self.store.save(item).await?;
        info!(item_id = ?saved.id, "Item created");
        Ok(saved)
    }

    /// Replace the item stored under `id`.
    pub async fn update(&self, id: i64, mut item: Item) -> Result<Item, ServiceError> {
        item.validate().map_err(ServiceError::Validation)?;

        if self.store.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(id));
        }

        item.id = Some(id);
        let saved = self.store.save(item).await?;
        debug!(item_id = id, "Item updated");
        Ok(saved)
    }

    /// Delete an item.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        self.store.delete_by_id(id).await?;
        debug!(item_id = id, "Item deleted");
        Ok(())
    }

    /// Mark every stored item as processed.
    pub async fn process_all(&self) -> Result<ProcessOutcome, ServiceError> {
        Ok(self.processor.process_all().await?)
    }
}
