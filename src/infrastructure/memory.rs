//! In-memory collaborators for tests and local runs without Postgres.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

use crate::domain::aggregates::{Product, UserProfile};
use crate::domain::events::DomainEvent;
use crate::ports::{EventPublisher, ProductSource, PublishError, RepositoryError, UserRepository};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserProfile>>,
    unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        Self { users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()), unavailable: AtomicBool::new(false) }
    }

    /// While set, every call fails with `RepositoryError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) { self.unavailable.store(unavailable, Ordering::SeqCst); }

    pub async fn snapshot(&self, id: &str) -> Option<UserProfile> { self.users.read().await.get(id).cloned() }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("user store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, id: &str) -> Result<UserProfile, RepositoryError> {
        self.check_available()?;
        self.users.read().await.get(id).cloned().ok_or_else(|| RepositoryError::UserNotFound(id.to_string()))
    }

    async fn update_user(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        self.check_available()?;
        self.users.write().await.insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}

/// Fixed product list, or a fixed failure.
#[derive(Debug)]
pub struct StaticProductSource {
    products: Result<Vec<Product>, String>,
}

impl StaticProductSource {
    pub fn new(products: Vec<Product>) -> Self { Self { products: Ok(products) } }
    pub fn failing(reason: impl Into<String>) -> Self { Self { products: Err(reason.into()) } }
}

#[async_trait]
impl ProductSource for StaticProductSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.clone().map_err(RepositoryError::Unavailable)
    }
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<DomainEvent>>,
}

impl EventLog {
    pub async fn events(&self) -> Vec<DomainEvent> { self.events.lock().await.clone() }
}

#[async_trait]
impl EventPublisher for EventLog {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
