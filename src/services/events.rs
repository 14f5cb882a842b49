//! Best-effort catalog event publishing over NATS.

use crate::domain::events::CatalogEvent;

#[derive(Clone, Default)]
pub struct EventSink { nats: Option<async_nats::Client> }

impl EventSink {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    /// A sink that drops every event.
    pub fn disabled() -> Self { Self::default() }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    /// Failures are logged, never returned.
    pub async fn publish(&self, event: CatalogEvent) {
        let Some(client) = &self.nats else { return };
        let subject = event.subject();
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(subject = %subject, error = %e, "Failed to encode catalog event");
                return;
            }
        };
        if let Err(e) = client.publish(subject.clone(), payload.into()).await {
            tracing::warn!(subject = %subject, error = %e, "Failed to publish catalog event");
        }
    }
}
