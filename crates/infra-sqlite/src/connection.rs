// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use evq_core::error::Result;
use evq_core::port::StorageOp;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

const MEMORY_PATH: &str = ":memory:";

/// Build a sqlx URL from a configured database path (`:memory:` supported)
pub fn database_url(path: &str) -> String {
    if path == MEMORY_PATH {
        "sqlite::memory:".to_string()
    } else if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite://{}", path)
    }
}

/// Create SQLite connection pool with WAL mode
///
/// In-memory databases live as long as their connection, so they get a single
/// connection that is never recycled.
pub async fn create_pool(url: &str) -> Result<SqlitePool> {
    let in_memory = url.contains(MEMORY_PATH);

    let mut options = SqliteConnectOptions::from_str(url)
        .map_err(|e| map_sqlx_error(StorageOp::Initialize, e))?
        .busy_timeout(Duration::from_secs(5))
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(4)
    };

    pool_options
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error(StorageOp::Initialize, e))
}
