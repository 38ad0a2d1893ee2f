// SQLite StorageAdapter Implementation

use crate::error::map_sqlx_error;
use crate::{create_pool, run_migrations};
use async_trait::async_trait;
use evq_core::config::BackendKind;
use evq_core::domain::QueueEntry;
use evq_core::error::{AppError, Result};
use evq_core::port::{StorageAdapter, StorageOp};
use sqlx::SqlitePool;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Persists queue entries in a `queue_entries` table.
///
/// The pool is opened lazily by `initialize`; every other call fails with a
/// storage error until then.
pub struct SqliteStorageAdapter {
    database_url: String,
    pool: OnceCell<SqlitePool>,
}

impl SqliteStorageAdapter {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool: OnceCell::new(),
        }
    }

    /// Wrap an existing pool; `initialize` still runs migrations on it
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self {
            database_url: String::new(),
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    /// Number of persisted entries
    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries")
            .fetch_one(self.pool(StorageOp::FetchAll)?)
            .await
            .map_err(|e| map_sqlx_error(StorageOp::FetchAll, e))
    }

    fn pool(&self, op: StorageOp) -> Result<&SqlitePool> {
        self.pool
            .get()
            .ok_or_else(|| AppError::storage(op, "SQLite adapter used before initialize"))
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorageAdapter {
    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn initialize(&self) -> Result<()> {
        let pool = self
            .pool
            .get_or_try_init(|| create_pool(&self.database_url))
            .await?;

        run_migrations(pool).await?;

        info!(url = %self.database_url, "SQLite storage initialized");
        Ok(())
    }

    async fn insert(&self, entry: &QueueEntry) -> Result<()> {
        sqlx::query("INSERT INTO queue_entries (id, message) VALUES (?, ?)")
            .bind(&entry.id)
            .bind(&entry.message)
            .execute(self.pool(StorageOp::Insert)?)
            .await
            .map_err(|e| map_sqlx_error(StorageOp::Insert, e))?;

        Ok(())
    }

    async fn delete(&self, entry: &QueueEntry) -> Result<()> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE id = ?")
            .bind(&entry.id)
            .execute(self.pool(StorageOp::Delete)?)
            .await
            .map_err(|e| map_sqlx_error(StorageOp::Delete, e))?;

        if result.rows_affected() == 0 {
            debug!(entry_id = %entry.id, "Deleted entry was not persisted");
        }

        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<QueueEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            "SELECT id, message FROM queue_entries ORDER BY seq ASC",
        )
        .fetch_all(self.pool(StorageOp::FetchAll)?)
        .await
        .map_err(|e| map_sqlx_error(StorageOp::FetchAll, e))?;

        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    message: String,
}

impl EntryRow {
    fn into_entry(self) -> QueueEntry {
        QueueEntry::new(self.id, self.message)
    }
}
