//! Queue behaviour when storage is unavailable

use async_trait::async_trait;
use evq_core::config::ConnectionParams;
use evq_core::port::{StorageAdapter, StorageAdapterFactory, StorageOp};
use evq_core::{AppError, BackendKind, EventQueue, QueueConfig, QueueEntry, Result};
use evq_infra_sqlite::SqliteAdapterFactory;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Adapter whose initialize always rejects and which counts every call
#[derive(Default)]
struct UnreachableStore {
    calls: AtomicUsize,
}

impl UnreachableStore {
    fn fail(&self, op: StorageOp) -> AppError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        AppError::storage(op, "connection refused")
    }
}

#[async_trait]
impl StorageAdapter for UnreachableStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn initialize(&self) -> Result<()> {
        Err(self.fail(StorageOp::Initialize))
    }

    async fn insert(&self, _entry: &QueueEntry) -> Result<()> {
        Err(self.fail(StorageOp::Insert))
    }

    async fn delete(&self, _entry: &QueueEntry) -> Result<()> {
        Err(self.fail(StorageOp::Delete))
    }

    async fn fetch_all(&self) -> Result<Vec<QueueEntry>> {
        Err(self.fail(StorageOp::FetchAll))
    }
}

struct UnreachableFactory(Arc<UnreachableStore>);

impl StorageAdapterFactory for UnreachableFactory {
    fn create(
        &self,
        _backend: BackendKind,
        _params: &ConnectionParams,
    ) -> Result<Arc<dyn StorageAdapter>> {
        Ok(self.0.clone() as Arc<dyn StorageAdapter>)
    }
}

fn config(path: &str) -> QueueConfig {
    QueueConfig::new(BackendKind::Sqlite)
        .with_host("db.invalid")
        .with_port(5432)
        .with_path(path)
}

#[tokio::test]
async fn test_rejected_initialize_leaves_pure_memory_fifo() {
    let store = Arc::new(UnreachableStore::default());
    let queue = EventQueue::open(config("queue"), Arc::new(UnreachableFactory(store.clone())))
        .await
        .unwrap();

    assert!(!queue.is_persistent());
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);

    for i in 0..10 {
        assert!(queue.enqueue(format!("m{}", i)).await);
    }
    assert_eq!(queue.hydrate().await, 0);
    assert_eq!(queue.len(), 10);

    for i in 0..10 {
        assert_eq!(queue.dequeue().await.unwrap().message, format!("m{}", i));
    }
    assert!(queue.dequeue().await.is_none());

    // Only the initialize call ever reached the adapter
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unopenable_sqlite_file_degrades() {
    let queue = EventQueue::open(
        config("/nonexistent-dir/deeper/queue.db"),
        Arc::new(SqliteAdapterFactory::default()),
    )
    .await
    .unwrap();

    assert!(!queue.is_persistent());
    queue.enqueue_event("still", None).await.unwrap();
    assert_eq!(queue.len(), 1);
}
