//! Mock item store for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::item::{Item, ItemStore, StoreError};

/// Mock implementation of the ItemStore trait.
///
/// Provides controllable behavior for testing:
/// - Seed items directly, bypassing `save`
/// - Inject failures per operation and per id
/// - Simulate latency, globally or per id
/// - Observe call counts and the peak number of concurrent calls
///
/// # Example
///
/// ```rust,ignore
/// use itemflow_core::testing::{fixtures, MockItemStore};
///
/// let store = MockItemStore::new();
/// store.insert(fixtures::queued_item(1)).await;
/// store.fail_find_by_id(1, "DB down").await;
///
/// let result = store.find_by_id(1).await;
/// assert!(result.is_err());
/// ```
#[derive(Debug)]
pub struct MockItemStore {
    items: Arc<RwLock<BTreeMap<i64, Item>>>,
    next_id: AtomicUsize,
    /// Ids whose lookup fails with the given error.
    find_errors: Arc<RwLock<HashMap<i64, StoreError>>>,
    /// Ids whose save fails with the given error.
    save_errors: Arc<RwLock<HashMap<i64, StoreError>>>,
    /// If set, the next insert (save without id) fails with this error.
    next_insert_error: Arc<RwLock<Option<StoreError>>>,
    /// If set, listing ids/items fails with this error.
    list_error: Arc<RwLock<Option<StoreError>>>,
    /// Latency added to every call.
    delay: Arc<RwLock<Duration>>,
    /// Extra latency added to lookups of specific ids.
    id_delays: Arc<RwLock<HashMap<i64, Duration>>>,
    find_calls: AtomicUsize,
    save_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockItemStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks one call for the concurrency high-water mark.
struct InFlight<'a>(&'a MockItemStore);

impl<'a> InFlight<'a> {
    fn enter(store: &'a MockItemStore) -> Self {
        let now = store.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        store.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(store)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockItemStore {
    /// Create a new, empty mock store.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicUsize::new(1),
            find_errors: Arc::new(RwLock::new(HashMap::new())),
            save_errors: Arc::new(RwLock::new(HashMap::new())),
            next_insert_error: Arc::new(RwLock::new(None)),
            list_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            id_delays: Arc::new(RwLock::new(HashMap::new())),
            find_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a mock store seeded with the given items (which must carry ids).
    pub async fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item).await;
        }
        store
    }

    /// Put an item straight into the store. Items without an id get the next free one.
    pub async fn insert(&self, mut item: Item) -> Item {
        let id = match item.id {
            Some(id) => id,
            None => self.next_id.fetch_add(1, Ordering::SeqCst) as i64,
        };
        item.id = Some(id);
        self.bump_next_id(id);
        self.items.write().await.insert(id, item.clone());
        item
    }

    /// Get an item without going through the trait (no latency, no failures).
    pub async fn get(&self, id: i64) -> Option<Item> {
        self.items.read().await.get(&id).cloned()
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Make lookups of `id` fail with a database error carrying `message`.
    pub async fn fail_find_by_id(&self, id: i64, message: &str) {
        self.find_errors
            .write()
            .await
            .insert(id, StoreError::Database(message.to_string()));
    }

    /// Make saves of `id` fail with a database error carrying `message`.
    pub async fn fail_save(&self, id: i64, message: &str) {
        self.save_errors
            .write()
            .await
            .insert(id, StoreError::Database(message.to_string()));
    }

    /// Configure the next insert to fail with the given error.
    pub async fn set_next_insert_error(&self, error: StoreError) {
        *self.next_insert_error.write().await = Some(error);
    }

    /// Make listing fail with a database error carrying `message`.
    pub async fn fail_listing(&self, message: &str) {
        *self.list_error.write().await = Some(StoreError::Database(message.to_string()));
    }

    /// Clear every injected failure.
    pub async fn clear_failures(&self) {
        self.find_errors.write().await.clear();
        self.save_errors.write().await.clear();
        *self.next_insert_error.write().await = None;
        *self.list_error.write().await = None;
    }

    /// Add latency to every call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Add latency to lookups of one id.
    pub async fn set_delay_for(&self, id: i64, delay: Duration) {
        self.id_delays.write().await.insert(id, delay);
    }

    /// Number of `find_by_id` calls made.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of `save` calls made.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Peak number of `find_by_id`/`save` calls running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn bump_next_id(&self, used: i64) {
        let candidate = (used + 1).max(1) as usize;
        self.next_id.fetch_max(candidate, Ordering::SeqCst);
    }

    async fn simulate_latency(&self, id: Option<i64>) {
        let mut delay = *self.delay.read().await;
        if let Some(id) = id {
            if let Some(extra) = self.id_delays.read().await.get(&id) {
                delay += *extra;
            }
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ItemStore for MockItemStore {
    async fn find_all(&self) -> Result<Vec<Item>, StoreError> {
        self.simulate_latency(None).await;
        if let Some(err) = self.list_error.read().await.clone() {
            return Err(err);
        }
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn find_all_ids(&self) -> Result<Vec<i64>, StoreError> {
        self.simulate_latency(None).await;
        if let Some(err) = self.list_error.read().await.clone() {
            return Err(err);
        }
        Ok(self.items.read().await.keys().copied().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Item>, StoreError> {
        let _in_flight = InFlight::enter(self);
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency(Some(id)).await;

        if let Some(err) = self.find_errors.read().await.get(&id).cloned() {
            return Err(err);
        }
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn save(&self, item: Item) -> Result<Item, StoreError> {
        let _in_flight = InFlight::enter(self);
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency(None).await;

        match item.id {
            Some(id) => {
                if let Some(err) = self.save_errors.read().await.get(&id).cloned() {
                    return Err(err);
                }
                self.bump_next_id(id);
                self.items.write().await.insert(id, item.clone());
                Ok(item)
            }
            None => {
                if let Some(err) = self.next_insert_error.write().await.take() {
                    return Err(err);
                }
                Ok(self.insert(item).await)
            }
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.simulate_latency(Some(id)).await;
        match self.items.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}
