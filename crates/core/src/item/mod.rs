//! Items and their storage.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteItemStore;
pub use store::{ItemStore, StoreError};
pub use types::{is_valid_email, Item, DEFAULT_STATUS, PROCESSED_STATUS};
