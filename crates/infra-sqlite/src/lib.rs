// Event Queue Infrastructure - SQLite Adapter
// Implements: StorageAdapter, StorageAdapterFactory

mod connection;
mod error;
mod factory;
mod migration;
mod storage_adapter;

pub use connection::{create_pool, database_url};
pub use factory::SqliteAdapterFactory;
pub use migration::run_migrations;
pub use storage_adapter::SqliteStorageAdapter;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
