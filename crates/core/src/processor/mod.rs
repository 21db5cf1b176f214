//! Bulk item processing.
//!
//! The `ItemProcessor` marks stored items as processed by fanning out one
//! unit of work per item onto a bounded pool:
//! - Each unit looks its item up, sets the status to `PROCESSED` and saves it
//! - Missing items are skipped, not failed
//! - The run resolves only after every unit finished, and fails with the first
//!   unit failure
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use itemflow_core::{ItemProcessor, ProcessorConfig, SqliteItemStore};
//!
//! let store = Arc::new(SqliteItemStore::new(path)?);
//! let processor = ItemProcessor::new(ProcessorConfig::default(), store);
//!
//! let outcome = processor.process_all().await?;
//! println!("processed {} items", outcome.processed_count);
//!
//! processor.shutdown();
//! ```

mod config;
mod engine;
mod types;

pub use config::{ProcessorConfig, MAX_POOL_SIZE};
pub use engine::ItemProcessor;
pub use types::{PoolStatus, ProcessError, ProcessOutcome, UnitOutcome};
