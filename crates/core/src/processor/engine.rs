//! Bulk item processor.
//!
//! One run fans out a unit of work per item id onto a bounded pool, joins
//! every unit, and only then reports. The accumulator is created per run and
//! dropped when the run returns.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::item::{Item, ItemStore, PROCESSED_STATUS};
use crate::metrics;

use super::config::{ProcessorConfig, MAX_POOL_SIZE};
use super::types::{PoolStatus, ProcessError, ProcessOutcome, UnitOutcome};

/// Outcome set and counters for a single run.
#[derive(Default)]
struct RunState {
    items: Mutex<Vec<Item>>,
    processed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicBool,
}

impl RunState {
    fn record(&self, item: Item) {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(item);
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn mark_failed(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }

    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Vec<Item> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Process-wide pool statistics. Never read for control flow.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    runs_completed: AtomicU64,
    runs_failed: AtomicU64,
    runs_abandoned: AtomicU64,
    total_processed: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
enum RunResult {
    Completed,
    Failed,
    /// The caller dropped the run before its units were joined.
    Abandoned,
}

impl RunResult {
    fn as_str(self) -> &'static str {
        match self {
            RunResult::Completed => "completed",
            RunResult::Failed => "failed",
            RunResult::Abandoned => "abandoned",
        }
    }
}

/// Counts a run exactly once. Held across the join so a run whose future is
/// dropped (for example on a caller timeout) is still recorded, as abandoned.
struct RunRecord<'a> {
    stats: &'a PoolStats,
    run_id: Uuid,
    start: Instant,
    settled: bool,
}

impl<'a> RunRecord<'a> {
    fn begin(stats: &'a PoolStats, run_id: Uuid) -> Self {
        Self {
            stats,
            run_id,
            start: Instant::now(),
            settled: false,
        }
    }

    fn settle(&mut self, result: RunResult) -> Duration {
        self.settled = true;
        let duration = self.start.elapsed();

        let counter = match result {
            RunResult::Completed => &self.stats.runs_completed,
            RunResult::Failed => &self.stats.runs_failed,
            RunResult::Abandoned => &self.stats.runs_abandoned,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        metrics::PROCESS_RUNS
            .with_label_values(&[result.as_str()])
            .inc();
        metrics::PROCESS_RUN_DURATION
            .with_label_values(&[result.as_str()])
            .observe(duration.as_secs_f64());

        duration
    }
}

impl Drop for RunRecord<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let duration = self.settle(RunResult::Abandoned);
            warn!(
                run_id = %self.run_id,
                duration_ms = duration.as_millis() as u64,
                "Processing run dropped before its units finished"
            );
        }
    }
}

/// Decrements the active-unit gauge even if the unit panics.
struct ActiveUnit<'a>(&'a PoolStats);

impl<'a> ActiveUnit<'a> {
    fn enter(stats: &'a PoolStats) -> Self {
        stats.active.fetch_add(1, Ordering::Relaxed);
        Self(stats)
    }
}

impl Drop for ActiveUnit<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Marks every stored item as processed using a bounded worker pool.
pub struct ItemProcessor {
    config: ProcessorConfig,
    store: Arc<dyn ItemStore>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
}

impl ItemProcessor {
    /// Creates a processor whose pool admits `config.pool_size` units at once.
    pub fn new(config: ProcessorConfig, store: Arc<dyn ItemStore>) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.pool_size.clamp(1, MAX_POOL_SIZE)));

        Self {
            config,
            store,
            semaphore,
            stats: Arc::new(PoolStats::default()),
        }
    }

    /// Returns the processor configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Whether the pool still accepts runs.
    pub fn is_running(&self) -> bool {
        !self.semaphore.is_closed()
    }

    /// Closes the pool.
    ///
    /// New runs fail with [`ProcessError::ShutDown`]. Units already holding a
    /// pool slot finish; units still waiting for one fail, which fails their run.
    pub fn shutdown(&self) {
        if self.semaphore.is_closed() {
            return;
        }
        self.semaphore.close();
        info!("Item processor shut down");
    }

    /// Returns the current pool status.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            running: self.is_running(),
            max_concurrent: self.config.pool_size,
            active_units: self.stats.active.load(Ordering::Relaxed) as usize,
            queued_units: self.stats.queued.load(Ordering::Relaxed) as usize,
            runs_completed: self.stats.runs_completed.load(Ordering::Relaxed),
            runs_failed: self.stats.runs_failed.load(Ordering::Relaxed),
            runs_abandoned: self.stats.runs_abandoned.load(Ordering::Relaxed),
            total_processed: self.stats.total_processed.load(Ordering::Relaxed),
        }
    }

    /// Processes every item currently in the store.
    pub async fn process_all(&self) -> Result<ProcessOutcome, ProcessError> {
        if !self.is_running() {
            return Err(ProcessError::ShutDown);
        }

        let ids = self.store.find_all_ids().await?;
        self.process_ids(ids).await
    }

    /// Processes the given item ids.
    ///
    /// Resolves only after every dispatched unit has finished. Fails with the
    /// first observed unit failure; ids without a stored item are skipped.
    pub async fn process_ids(&self, ids: Vec<i64>) -> Result<ProcessOutcome, ProcessError> {
        if !self.is_running() {
            return Err(ProcessError::ShutDown);
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = ids.len();
        let run = Arc::new(RunState::default());
        let mut record = RunRecord::begin(&self.stats, run_id);

        info!(
            run_id = %run_id,
            items = total,
            pool_size = self.config.pool_size,
            "Starting processing run"
        );

        let mut units: FuturesUnordered<JoinHandle<Result<UnitOutcome, ProcessError>>> = ids
            .into_iter()
            .map(|id| self.spawn_unit(run_id, id, Arc::clone(&run)))
            .collect();

        let mut first_error: Option<ProcessError> = None;
        let mut abandoned = 0usize;

        while let Some(joined) = units.next().await {
            let result = joined.unwrap_or_else(|e| Err(ProcessError::TaskFailed(e.to_string())));
            match result {
                Ok(UnitOutcome::Abandoned) => abandoned += 1,
                Ok(_) => {}
                Err(e) => {
                    run.mark_failed();
                    if first_error.is_none() {
                        warn!(run_id = %run_id, error = %e, "Unit of work failed, failing run");
                        first_error = Some(e);
                    }
                }
            }
        }

        let processed_count = run.processed.load(Ordering::SeqCst);
        let skipped_count = run.skipped.load(Ordering::SeqCst);

        self.stats
            .total_processed
            .fetch_add(processed_count as u64, Ordering::Relaxed);

        if let Some(e) = first_error {
            let duration = record.settle(RunResult::Failed);
            warn!(
                run_id = %run_id,
                processed = processed_count,
                skipped = skipped_count,
                abandoned = abandoned,
                duration_ms = duration.as_millis() as u64,
                "Processing run failed"
            );
            return Err(e);
        }

        let items = run.snapshot();
        let duration = record.settle(RunResult::Completed);

        info!(
            run_id = %run_id,
            processed = processed_count,
            skipped = skipped_count,
            duration_ms = duration.as_millis() as u64,
            "Processing run completed"
        );

        Ok(ProcessOutcome {
            run_id,
            started_at,
            finished_at: Utc::now(),
            items,
            processed_count,
            skipped_count,
        })
    }

    fn spawn_unit(
        &self,
        run_id: Uuid,
        id: i64,
        run: Arc<RunState>,
    ) -> JoinHandle<Result<UnitOutcome, ProcessError>> {
        let store = Arc::clone(&self.store);
        let semaphore = Arc::clone(&self.semaphore);
        let stats = Arc::clone(&self.stats);

        stats.queued.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            let result = Self::run_unit(store.as_ref(), &semaphore, &stats, &run, id).await;
            match &result {
                Ok(outcome) => {
                    debug!(run_id = %run_id, item_id = id, outcome = ?outcome, "Unit finished");
                }
                Err(e) => {
                    debug!(run_id = %run_id, item_id = id, error = %e, "Unit failed");
                }
            }
            result
        })
    }

    async fn run_unit(
        store: &dyn ItemStore,
        semaphore: &Semaphore,
        stats: &PoolStats,
        run: &RunState,
        id: i64,
    ) -> Result<UnitOutcome, ProcessError> {
        let permit = semaphore.acquire().await;
        stats.queued.fetch_sub(1, Ordering::Relaxed);
        let _permit = permit.map_err(|_| ProcessError::ShutDown)?;

        if run.is_failed() {
            return Ok(UnitOutcome::Abandoned);
        }

        let _active = ActiveUnit::enter(stats);
        let result = Self::process_item(store, run, id).await;
        if result.is_err() {
            // Flag before the permit is released so queued siblings see it.
            run.mark_failed();
        }
        result
    }

    async fn process_item(
        store: &dyn ItemStore,
        run: &RunState,
        id: i64,
    ) -> Result<UnitOutcome, ProcessError> {
        let Some(mut item) = store.find_by_id(id).await? else {
            run.record_skip();
            metrics::ITEMS_SKIPPED.inc();
            return Ok(UnitOutcome::Skipped);
        };

        item.status = PROCESSED_STATUS.to_string();
        let saved = store.save(item).await?;

        run.record(saved);
        metrics::ITEMS_PROCESSED.inc();
        Ok(UnitOutcome::Processed)
    }
}
