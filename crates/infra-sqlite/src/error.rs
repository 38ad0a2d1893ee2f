// sqlx::Error -> AppError mapping

use evq_core::error::AppError;
use evq_core::port::StorageOp;

/// Convert sqlx::Error to a storage error with structured information
pub(crate) fn map_sqlx_error(op: StorageOp, err: sqlx::Error) -> AppError {
    let message = match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            // SQLite error codes: https://www.sqlite.org/rescode.html
            Some(code) => match code.as_ref() {
                "2067" | "1555" => format!(
                    "Unique constraint violation: {} ({})",
                    db_err.message(),
                    code
                ),
                "5" => format!("Database locked (SQLITE_BUSY): {}", db_err.message()),
                "13" => format!("Database full: {}", db_err.message()),
                other => format!("Database error [{}]: {}", other, db_err.message()),
            },
            None => format!("Database error: {}", db_err.message()),
        },
        sqlx::Error::RowNotFound => "Row not found".to_string(),
        sqlx::Error::ColumnNotFound(col) => format!("Column not found: {}", col),
        sqlx::Error::PoolTimedOut => "Connection pool timed out".to_string(),
        // Connection, pool, protocol errors
        _ => err.to_string(),
    };

    AppError::storage(op, message)
}
