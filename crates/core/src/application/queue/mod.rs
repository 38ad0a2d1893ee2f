// Event Queue Core - FIFO buffer mirrored to an optional storage adapter

mod builder;
mod envelope;

pub use builder::{EventQueueBuilder, PendingQueue};

use crate::application::notification::{Notification, NotificationBus, SubscriptionId};
use crate::config::QueueConfig;
use crate::domain::QueueEntry;
use crate::error::Result;
use crate::port::{IdProvider, StorageAdapter};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Ordered message buffer with best-effort persistence.
///
/// The in-memory buffer is authoritative for the running process: storage
/// failures are logged and never change the outcome of an operation.
/// The buffer lock is only taken in synchronous sections, so each operation's
/// own mutation is atomic but operations may interleave at adapter awaits.
pub struct EventQueue {
    config: QueueConfig,
    buffer: Mutex<VecDeque<QueueEntry>>,
    storage: Option<Arc<dyn StorageAdapter>>,
    id_provider: Arc<dyn IdProvider>,
    bus: NotificationBus,
}

impl EventQueue {
    /// Start a two-phase construction (validate, then open)
    pub fn builder(config: QueueConfig) -> EventQueueBuilder {
        EventQueueBuilder::new(config)
    }

    pub(crate) fn from_parts(
        config: QueueConfig,
        storage: Option<Arc<dyn StorageAdapter>>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            config,
            buffer: Mutex::new(VecDeque::new()),
            storage,
            id_provider,
            bus: NotificationBus::new(),
        }
    }

    /// Load every persisted entry into the buffer.
    ///
    /// Entries are appended in the order the adapter returns them and are not
    /// deduplicated: hydrating twice buffers every entry twice.
    /// Returns the number of entries appended.
    pub async fn hydrate(&self) -> usize {
        let Some(storage) = &self.storage else {
            return 0;
        };

        let Some(entries) = best_effort(storage.fetch_all().await, "hydrate") else {
            return 0;
        };

        let count = entries.len();
        self.buffer().extend(entries);
        info!(count, "Hydrated queue from storage");
        count
    }

    /// Append a message; always succeeds once the in-memory append is reached
    pub async fn enqueue(&self, message: impl Into<String>) -> bool {
        let entry = QueueEntry::new(self.id_provider.generate_id(), message);

        if let Some(storage) = &self.storage {
            best_effort(storage.insert(&entry).await, "insert");
        }

        debug!(entry_id = %entry.id, "Entry enqueued");
        self.buffer().push_back(entry);
        true
    }

    /// Remove and return the head of the buffer, `None` when empty
    pub async fn dequeue(&self) -> Option<QueueEntry> {
        let entry = self.buffer().pop_front()?;

        if let Some(storage) = &self.storage {
            best_effort(storage.delete(&entry).await, "delete");
        }

        debug!(entry_id = %entry.id, "Entry dequeued");
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    /// Whether a storage adapter survived open (false in degraded mode)
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Event names this queue is scoped to
    pub fn events(&self) -> &[String] {
        &self.config.events
    }

    /// Subscribe to a lifecycle event (`EVENT_QUEUED`, `EVENT_DEQUEUED`)
    pub fn on<F>(&self, event_name: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.bus.subscribe(event_name, handler)
    }

    pub fn off(&self, event_name: &str, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(event_name, id)
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<QueueEntry>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("backend", &self.config.backend)
            .field("persistent", &self.is_persistent())
            .field("len", &self.len())
            .finish()
    }
}

/// Persistence is best-effort: log the failure and carry on without the value
fn best_effort<T>(result: Result<T>, action: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(error = %e, action, "Storage call failed, continuing in memory");
            None
        }
    }
}
