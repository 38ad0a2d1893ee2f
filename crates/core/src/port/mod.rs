// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod storage_adapter;

// Re-exports
pub use id_provider::{IdProvider, UuidProvider};
pub use storage_adapter::{StorageAdapter, StorageAdapterFactory, StorageOp};
