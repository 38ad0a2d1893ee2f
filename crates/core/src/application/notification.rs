//! Notification Bus
//!
//! In-process publish/subscribe owned by each queue instance. Handlers run
//! synchronously on the emitting task, in subscription order. Nothing is
//! persisted: an event emitted with no subscribers is simply dropped.

use crate::domain::Envelope;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Emitted after `enqueue_event` appends an envelope (payload: serialized text)
pub const EVENT_QUEUED: &str = "EVENT_QUEUED";

/// Emitted after `dequeue_event` parses an envelope (payload: the envelope)
pub const EVENT_DEQUEUED: &str = "EVENT_DEQUEUED";

/// Data delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Queued(String),
    Dequeued(Envelope),
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Notification) + Send + Sync>;

#[derive(Default)]
pub struct NotificationBus {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<String, Vec<(SubscriptionId, Handler)>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, event_name: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(event_name.into())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Returns false if the subscription was not registered under `event_name`
    pub fn unsubscribe(&self, event_name: &str, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let Some(handlers) = subscribers.get_mut(event_name) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        let removed = handlers.len() != before;

        if handlers.is_empty() {
            subscribers.remove(event_name);
        }
        removed
    }

    /// Invoke every current subscriber of `event_name`; returns how many ran
    pub fn emit(&self, event_name: &str, notification: &Notification) -> usize {
        // Snapshot so handlers may subscribe/unsubscribe without deadlocking
        let handlers: Vec<Handler> = match self.lock().get(event_name) {
            Some(handlers) => handlers.iter().map(|(_, h)| h.clone()).collect(),
            None => return 0,
        };

        trace!(event = event_name, subscribers = handlers.len(), "Emitting notification");

        for handler in &handlers {
            handler(notification);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.lock().get(event_name).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<(SubscriptionId, Handler)>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<String, usize> = self
            .lock()
            .iter()
            .map(|(name, handlers)| (name.clone(), handlers.len()))
            .collect();
        f.debug_struct("NotificationBus")
            .field("subscribers", &counts)
            .finish()
    }
}
