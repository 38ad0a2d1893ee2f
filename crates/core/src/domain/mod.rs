// Domain Layer - Queue entries and RPC envelopes

pub mod entry;
pub mod envelope;

// Re-exports
pub use entry::{EntryId, QueueEntry};
pub use envelope::Envelope;
