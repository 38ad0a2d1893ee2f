// RPC Envelope Helpers - `{method, payload}` messages on top of the raw queue

use super::EventQueue;
use crate::application::notification::{Notification, EVENT_DEQUEUED, EVENT_QUEUED};
use crate::domain::Envelope;
use crate::error::Result;
use tracing::warn;

impl EventQueue {
    /// Enqueue an envelope and announce it with `EVENT_QUEUED`.
    ///
    /// Returns the serialized text that was stored and emitted.
    pub async fn enqueue_event(
        &self,
        method: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) -> Result<String> {
        let text = Envelope::new(method, payload).to_text()?;

        self.enqueue(text.clone()).await;
        self.bus.emit(EVENT_QUEUED, &Notification::Queued(text.clone()));

        Ok(text)
    }

    /// Dequeue the next envelope and announce it with `EVENT_DEQUEUED`.
    ///
    /// `Ok(None)` on an empty queue. A message that is not envelope text is
    /// consumed anyway and reported as `MalformedEnvelope`; nothing is emitted.
    pub async fn dequeue_event(&self) -> Result<Option<Envelope>> {
        let Some(entry) = self.dequeue().await else {
            return Ok(None);
        };

        let envelope = Envelope::parse(&entry.message).inspect_err(|e| {
            warn!(entry_id = %entry.id, error = %e, "Dequeued entry is not an envelope");
        })?;

        self.bus
            .emit(EVENT_DEQUEUED, &Notification::Dequeued(envelope.clone()));

        Ok(Some(envelope))
    }
}
