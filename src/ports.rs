//! Boundaries to the collaborators the storefront does not own: the
//! product fetch, the user-profile store and the event bus.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::domain::aggregates::{Product, UserProfile};
use crate::domain::events::DomainEvent;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Publish failed: {0}")]
    Transport(String),
}

#[automock]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Current profile for `id`.
    async fn get_user(&self, id: &str) -> Result<UserProfile, RepositoryError>;

    /// Overwrites the stored profile with `profile`.
    async fn update_user(&self, profile: &UserProfile) -> Result<(), RepositoryError>;
}

#[automock]
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, RepositoryError>;
}

#[automock]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError>;
}

/// Publishes every event, logging failures instead of returning them.
pub async fn publish_all(publisher: &dyn EventPublisher, events: Vec<DomainEvent>) {
    for event in events {
        if let Err(e) = publisher.publish(&event).await {
            tracing::warn!(error = %e, subject = event.subject(), "Event publish failed");
        }
    }
}
