// Event Queue Core - Queue, Notification Bus & Ports
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{
    EventQueue, EventQueueBuilder, Notification, NotificationBus, PendingQueue, SubscriptionId,
    EVENT_DEQUEUED, EVENT_QUEUED,
};
pub use config::{BackendKind, ConnectionParams, QueueConfig};
pub use domain::{Envelope, QueueEntry};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
