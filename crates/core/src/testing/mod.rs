//! Testing utilities and mock implementations.
//!
//! This module provides a mock implementation of the storage trait plus
//! fixtures, so the processor, the service and the HTTP layer can be tested
//! without a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use itemflow_core::testing::{fixtures, MockItemStore};
//!
//! let store = MockItemStore::with_items([fixtures::queued_item(1), fixtures::queued_item(2)]).await;
//!
//! // Configure failures and latency
//! store.fail_find_by_id(2, "DB down").await;
//! store.set_delay(std::time::Duration::from_millis(5)).await;
//! ```

mod mock_store;

pub use mock_store::MockItemStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::item::{Item, PROCESSED_STATUS};

    /// An unsaved `QUEUED` item numbered `n`.
    pub fn new_item(n: i64) -> Item {
        Item::new(
            format!("name{}", n),
            format!("description{}", n),
            "QUEUED",
            format!("email{}@test.com", n),
        )
    }

    /// A stored `QUEUED` item with id `n`.
    pub fn queued_item(n: i64) -> Item {
        new_item(n).with_id(n)
    }

    /// A stored `PROCESSED` item with id `n`.
    pub fn processed_item(n: i64) -> Item {
        let mut item = queued_item(n);
        item.status = PROCESSED_STATUS.to_string();
        item
    }

    /// Stored `QUEUED` items with ids `1..=count`.
    pub fn queued_items(count: i64) -> Vec<Item> {
        (1..=count).map(queued_item).collect()
    }
}
