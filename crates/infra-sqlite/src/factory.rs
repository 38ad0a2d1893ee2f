// SQLite StorageAdapterFactory

use crate::{database_url, SqliteStorageAdapter};
use evq_core::config::{BackendKind, ConnectionParams};
use evq_core::error::{AppError, Result};
use evq_core::port::{StorageAdapter, StorageAdapterFactory};
use std::sync::Arc;
use tracing::debug;

/// Builds SQLite adapters; `path` names the database file.
///
/// SQLite is embedded, so host and port are only recorded in logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteAdapterFactory;

impl StorageAdapterFactory for SqliteAdapterFactory {
    fn create(
        &self,
        backend: BackendKind,
        params: &ConnectionParams,
    ) -> Result<Arc<dyn StorageAdapter>> {
        if backend != BackendKind::Sqlite {
            return Err(AppError::Config(format!(
                "SQLite factory cannot serve backend {}",
                backend
            )));
        }

        debug!(
            host = %params.host,
            port = params.port,
            path = %params.path,
            "Creating SQLite storage adapter"
        );

        Ok(Arc::new(SqliteStorageAdapter::new(database_url(&params.path))))
    }
}
