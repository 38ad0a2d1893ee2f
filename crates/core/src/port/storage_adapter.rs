// Storage Adapter Port (Interface)

use crate::config::{BackendKind, ConnectionParams};
use crate::domain::QueueEntry;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Adapter operation, carried in `AppError::Storage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOp {
    Initialize,
    Insert,
    Delete,
    FetchAll,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageOp::Initialize => write!(f, "initialize"),
            StorageOp::Insert => write!(f, "insert"),
            StorageOp::Delete => write!(f, "delete"),
            StorageOp::FetchAll => write!(f, "fetch_all"),
        }
    }
}

/// Persistence interface for queue entries.
///
/// The queue treats every call as best-effort and never assumes transactional
/// semantics across calls. Entries are opaque `{id, message}` records.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Backend this adapter serves (identity check during open)
    fn backend(&self) -> BackendKind;

    /// Connect and prepare the store
    async fn initialize(&self) -> Result<()>;

    /// Persist a new entry
    async fn insert(&self, entry: &QueueEntry) -> Result<()>;

    /// Remove a persisted entry (matched by id)
    async fn delete(&self, entry: &QueueEntry) -> Result<()>;

    /// Load every persisted entry, in the store's order
    async fn fetch_all(&self) -> Result<Vec<QueueEntry>>;
}

/// Creates a storage adapter for a backend kind and connection parameters
pub trait StorageAdapterFactory: Send + Sync {
    fn create(
        &self,
        backend: BackendKind,
        params: &ConnectionParams,
    ) -> Result<Arc<dyn StorageAdapter>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-process adapter that records every call and can fail on demand
    pub struct MockStorageAdapter {
        backend: BackendKind,
        entries: Mutex<Vec<QueueEntry>>,
        failing: Mutex<HashSet<StorageOp>>,
        calls: Mutex<Vec<StorageOp>>,
    }

    impl MockStorageAdapter {
        pub fn new(backend: BackendKind) -> Self {
            Self {
                backend,
                entries: Mutex::new(Vec::new()),
                failing: Mutex::new(HashSet::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Pre-populate the store (as if written by an earlier process)
        pub fn with_entries(self, entries: Vec<QueueEntry>) -> Self {
            *self.entries.lock().unwrap() = entries;
            self
        }

        pub fn failing_on(self, op: StorageOp) -> Self {
            self.failing.lock().unwrap().insert(op);
            self
        }

        pub fn set_failing(&self, op: StorageOp, failing: bool) {
            let mut set = self.failing.lock().unwrap();
            if failing {
                set.insert(op);
            } else {
                set.remove(&op);
            }
        }

        pub fn calls(&self) -> Vec<StorageOp> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, op: StorageOp) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
        }

        pub fn stored(&self) -> Vec<QueueEntry> {
            self.entries.lock().unwrap().clone()
        }

        fn record(&self, op: StorageOp) -> Result<()> {
            self.calls.lock().unwrap().push(op);
            if self.failing.lock().unwrap().contains(&op) {
                return Err(AppError::storage(op, "mock failure"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StorageAdapter for MockStorageAdapter {
        fn backend(&self) -> BackendKind {
            self.backend
        }

        async fn initialize(&self) -> Result<()> {
            self.record(StorageOp::Initialize)
        }

        async fn insert(&self, entry: &QueueEntry) -> Result<()> {
            self.record(StorageOp::Insert)?;
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn delete(&self, entry: &QueueEntry) -> Result<()> {
            self.record(StorageOp::Delete)?;
            self.entries.lock().unwrap().retain(|e| e.id != entry.id);
            Ok(())
        }

        async fn fetch_all(&self) -> Result<Vec<QueueEntry>> {
            self.record(StorageOp::FetchAll)?;
            Ok(self.entries.lock().unwrap().clone())
        }
    }

    /// Factory handing out a shared mock adapter (or failing outright)
    pub struct MockAdapterFactory {
        adapter: Option<Arc<MockStorageAdapter>>,
        created: Mutex<usize>,
    }

    impl MockAdapterFactory {
        pub fn new(adapter: Arc<MockStorageAdapter>) -> Self {
            Self {
                adapter: Some(adapter),
                created: Mutex::new(0),
            }
        }

        pub fn new_failing() -> Self {
            Self {
                adapter: None,
                created: Mutex::new(0),
            }
        }

        pub fn created(&self) -> usize {
            *self.created.lock().unwrap()
        }
    }

    impl StorageAdapterFactory for MockAdapterFactory {
        fn create(
            &self,
            _backend: BackendKind,
            _params: &ConnectionParams,
        ) -> Result<Arc<dyn StorageAdapter>> {
            *self.created.lock().unwrap() += 1;
            match &self.adapter {
                Some(adapter) => Ok(adapter.clone() as Arc<dyn StorageAdapter>),
                None => Err(AppError::Config("mock factory refused".to_string())),
            }
        }
    }
}
