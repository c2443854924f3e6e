//! Forwards domain events to NATS.

use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

#[derive(Clone, Debug)]
pub struct NatsEventPublisher {
    client: async_nats::Client,
}

impl NatsEventPublisher {
    pub async fn connect(url: &str) -> Result<Self, async_nats::ConnectError> {
        Ok(Self { client: async_nats::connect(url).await? })
    }

    /// Best effort: a failed publish is logged and dropped.
    pub async fn publish(&self, events: &[DomainEvent]) {
        for event in events {
            let payload = match encode(event) {
                Ok(payload) => payload,
                Err(e) => { warn!(error = %e, "failed to encode event"); continue; }
            };
            match self.client.publish(event.subject().to_string(), payload.into()).await {
                Ok(()) => debug!(subject = event.subject(), "event published"),
                Err(e) => warn!(subject = event.subject(), error = %e, "failed to publish event"),
            }
        }
    }
}

fn encode(event: &DomainEvent) -> Result<Vec<u8>, serde_json::Error> { serde_json::to_vec(event) }
