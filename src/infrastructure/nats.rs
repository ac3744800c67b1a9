//! Event publishing over NATS.

use async_trait::async_trait;

use crate::domain::events::DomainEvent;
use crate::ports::{EventPublisher, PublishError};

#[derive(Clone, Debug)]
pub struct NatsPublisher { client: async_nats::Client }

impl NatsPublisher {
    pub fn new(client: async_nats::Client) -> Self { Self { client } }

    pub async fn connect(url: &str) -> Result<Self, PublishError> {
        let client = async_nats::connect(url).await.map_err(|e| PublishError::Transport(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl EventPublisher for NatsPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(event)?;
        self.client.publish(event.subject().to_string(), payload.into()).await
            .map_err(|e| PublishError::Transport(e.to_string()))
    }
}

/// Used when no `NATS_URL` is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        tracing::debug!(subject = event.subject(), "Event publishing disabled");
        Ok(())
    }
}
