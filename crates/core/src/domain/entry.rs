// Queue Entry Domain Model

use serde::{Deserialize, Serialize};

/// Entry ID (UUID v4)
pub type EntryId = String;

/// Unit of work held by the queue and mirrored to the storage adapter.
///
/// Entries are never mutated after creation; dequeue hands ownership to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub message: String,
}

impl QueueEntry {
    pub fn new(id: impl Into<EntryId>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}
