//! SQLite-backed queue persistence across reopen

use evq_core::{AppError, BackendKind, EventQueue, EventQueueBuilder, QueueConfig};
use evq_infra_sqlite::{create_pool, database_url, SqliteAdapterFactory};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn sqlite_config(path: &Path) -> QueueConfig {
    QueueConfig::new(BackendKind::Sqlite)
        .with_host("localhost")
        .with_port(0)
        .with_path(path.to_str().unwrap())
}

async fn open(path: &Path) -> EventQueue {
    EventQueue::open(sqlite_config(path), Arc::new(SqliteAdapterFactory::default()))
        .await
        .unwrap()
}

async fn persisted_rows(path: &Path) -> i64 {
    let pool = create_pool(&database_url(path.to_str().unwrap()))
        .await
        .unwrap();
    sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries")
        .fetch_one(&pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_restart_restores_entries_in_order() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("queue.db");

    {
        let queue = open(&db).await;
        assert!(queue.is_persistent());
        for msg in ["m1", "m2", "m3"] {
            assert!(queue.enqueue(msg).await);
        }
    }

    let queue = open(&db).await;
    assert!(queue.is_empty());
    assert_eq!(queue.hydrate().await, 3);

    let mut messages = Vec::new();
    while let Some(entry) = queue.dequeue().await {
        messages.push(entry.message);
    }
    assert_eq!(messages, vec!["m1", "m2", "m3"]);
}

#[tokio::test]
async fn test_dequeue_deletes_persisted_entry() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("queue.db");

    let queue = open(&db).await;
    queue.enqueue("consumed").await;
    queue.enqueue("left over").await;
    let consumed = queue.dequeue().await.unwrap();
    assert_eq!(consumed.message, "consumed");
    drop(queue);

    assert_eq!(persisted_rows(&db).await, 1);

    let reopened = open(&db).await;
    reopened.hydrate().await;
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.dequeue().await.unwrap().message, "left over");
}

#[tokio::test]
async fn test_hydrate_twice_appends_duplicates() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("queue.db");

    {
        let queue = open(&db).await;
        for i in 0..3 {
            queue.enqueue(format!("persisted-{}", i)).await;
        }
    }

    let queue = open(&db).await;
    queue.hydrate().await;
    queue.hydrate().await;
    assert_eq!(queue.len(), 6);

    let first = queue.dequeue().await.unwrap();
    let mut fourth = None;
    for _ in 0..3 {
        fourth = queue.dequeue().await;
    }
    // Same persisted row buffered twice
    assert_eq!(fourth.map(|e| e.id), Some(first.id));
}

#[tokio::test]
async fn test_entry_ids_survive_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("queue.db");

    open(&db).await.enqueue("keep my id").await;

    let pool = create_pool(&database_url(db.to_str().unwrap()))
        .await
        .unwrap();
    let stored_id: String = sqlx::query_scalar("SELECT id FROM queue_entries")
        .fetch_one(&pool)
        .await
        .unwrap();

    let queue = open(&db).await;
    queue.hydrate().await;
    let restored = queue.dequeue().await.unwrap();
    assert_eq!(restored.id, stored_id);
    assert_eq!(restored.message, "keep my id");
}

#[tokio::test]
async fn test_memory_backend_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("queue.db");

    let config = QueueConfig::in_memory().with_path(db.to_str().unwrap());
    let queue = EventQueue::open(config, Arc::new(SqliteAdapterFactory::default()))
        .await
        .unwrap();

    queue.enqueue("ephemeral").await;
    assert!(!queue.is_persistent());
    assert!(!db.exists());
}

#[test]
fn test_missing_host_is_rejected_before_open() {
    let config = QueueConfig::new(BackendKind::Sqlite)
        .with_port(0)
        .with_path("unused.db");

    let result = EventQueueBuilder::new(config)
        .with_adapter_factory(Arc::new(SqliteAdapterFactory::default()))
        .build();

    match result {
        Err(AppError::MissingConfiguration { field }) => assert_eq!(field, "host"),
        Err(other) => panic!("Expected MissingConfiguration, got {:?}", other),
        Ok(_) => panic!("Expected MissingConfiguration, got a queue"),
    }
}
