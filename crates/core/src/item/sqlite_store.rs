//! SQLite-backed item store implementation.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::{Item, ItemStore, StoreError};

/// SQLite-backed item store.
///
/// The connection sits behind a mutex, so concurrent callers are serialized
/// here and the store can be shared freely between tasks. Every call runs on
/// tokio's blocking pool; waiting for the connection never parks a runtime
/// worker.
pub struct SqliteItemStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteItemStore {
    /// Create a new SQLite item store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(map_sqlite_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory SQLite item store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(trim(name)) > 0),
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL,
                email TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_status ON items(status);
            "#,
        )
        .map_err(map_sqlite_error)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Database(format!("store task failed: {}", e)))?
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            status: row.get(3)?,
            email: row.get(4)?,
        })
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock()
        .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))
}

/// Constraint violations are conflicts; everything else is a backend failure.
fn map_sqlite_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(e.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn find_all(&self) -> Result<Vec<Item>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, description, status, email FROM items ORDER BY id ASC")
                .map_err(map_sqlite_error)?;

            let rows = stmt
                .query_map([], Self::row_to_item)
                .map_err(map_sqlite_error)?;

            let mut items = Vec::new();
            for row_result in rows {
                items.push(row_result.map_err(map_sqlite_error)?);
            }

            Ok(items)
        })
        .await
    }

    async fn find_all_ids(&self) -> Result<Vec<i64>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id FROM items ORDER BY id ASC")
                .map_err(map_sqlite_error)?;

            let rows = stmt
                .query_map([], |row| row.get::<_, i64>(0))
                .map_err(map_sqlite_error)?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sqlite_error)
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Item>, StoreError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, name, description, status, email FROM items WHERE id = ?",
                params![id],
                Self::row_to_item,
            )
            .optional()
            .map_err(map_sqlite_error)
        })
        .await
    }

    async fn save(&self, item: Item) -> Result<Item, StoreError> {
        self.with_conn(move |conn| {
            let now = Utc::now().to_rfc3339();

            let id = match item.id {
                None => {
                    conn.execute(
                        "INSERT INTO items (name, description, status, email, updated_at) VALUES (?, ?, ?, ?, ?)",
                        params![item.name, item.description, item.status, item.email, now],
                    )
                    .map_err(map_sqlite_error)?;
                    conn.last_insert_rowid()
                }
                Some(id) => {
                    conn.execute(
                        r#"
                        INSERT INTO items (id, name, description, status, email, updated_at)
                        VALUES (?, ?, ?, ?, ?, ?)
                        ON CONFLICT(id) DO UPDATE SET
                            name = excluded.name,
                            description = excluded.description,
                            status = excluded.status,
                            email = excluded.email,
                            updated_at = excluded.updated_at
                        "#,
                        params![id, item.name, item.description, item.status, item.email, now],
                    )
                    .map_err(map_sqlite_error)?;
                    id
                }
            };

            Ok(Item {
                id: Some(id),
                ..item
            })
        })
        .await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let deleted = conn
                .execute("DELETE FROM items WHERE id = ?", params![id])
                .map_err(map_sqlite_error)?;

            if deleted == 0 {
                return Err(StoreError::NotFound(id));
            }

            Ok(())
        })
        .await
    }
}
