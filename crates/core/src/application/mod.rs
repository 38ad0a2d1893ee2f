// Application Layer - Queue core and its notification bus

pub mod notification;
pub mod queue;

// Re-exports
pub use notification::{
    Notification, NotificationBus, SubscriptionId, EVENT_DEQUEUED, EVENT_QUEUED,
};
pub use queue::{EventQueue, EventQueueBuilder, PendingQueue};
