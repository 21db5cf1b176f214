//! Types for the processor module.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::item::{Item, StoreError};

/// Error type for processing runs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProcessError {
    /// A lookup or save failed inside a unit of work, or the id listing failed.
    #[error("Item processing failed: {0}")]
    Store(#[from] StoreError),

    /// A unit of work panicked or was aborted before reporting a result.
    #[error("Processing task failed: {0}")]
    TaskFailed(String),

    /// The worker pool has been shut down.
    #[error("Processor is shut down")]
    ShutDown,
}

/// Result of a successful processing run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    /// Identifier used to correlate this run in logs.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Items that were found, marked processed and saved, in completion order.
    pub items: Vec<Item>,
    /// Number of items recorded by this run.
    pub processed_count: usize,
    /// Number of ids that had no stored item.
    pub skipped_count: usize,
}

/// How a single unit of work ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Item found, processed, saved and recorded.
    Processed,
    /// No item with this id.
    Skipped,
    /// Never started because a sibling unit had already failed.
    Abandoned,
}

/// Status of the worker pool.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    /// Whether the pool accepts new runs.
    pub running: bool,
    /// Maximum concurrent units.
    pub max_concurrent: usize,
    /// Units currently holding a pool slot.
    pub active_units: usize,
    /// Units waiting for a pool slot.
    pub queued_units: usize,
    /// Runs that completed successfully since startup.
    pub runs_completed: u64,
    /// Runs that failed since startup.
    pub runs_failed: u64,
    /// Runs dropped by their caller before every unit was joined.
    pub runs_abandoned: u64,
    /// Items processed since startup, across all runs.
    pub total_processed: u64,
}
