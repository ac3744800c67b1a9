//! Application state shared across handlers.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::application::{Catalog, CheckoutService, SessionRegistry};
use crate::config::AppConfig;
use crate::infrastructure::{NatsPublisher, NoopPublisher, PgProductSource, PgUserRepository};
use crate::ports::{EventPublisher, ProductSource, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub catalog: Arc<Catalog>,
    pub checkout: Arc<CheckoutService>,
    pub events: Arc<dyn EventPublisher>,
    pub listing_path: Arc<str>,
}

impl AppState {
    /// Wires the state from explicit collaborators.
    pub fn new(config: &AppConfig, products: Arc<dyn ProductSource>, users: Arc<dyn UserRepository>, events: Arc<dyn EventPublisher>) -> Self {
        let checkout = CheckoutService::new(users, Arc::clone(&events))
            .with_policy(config.purchase_history)
            .with_confirmation_delay(config.confirmation_delay);
        Self {
            sessions: Arc::new(SessionRegistry::new(&config.currency)),
            catalog: Arc::new(Catalog::new(products, &config.currency)),
            checkout: Arc::new(checkout),
            events,
            listing_path: Arc::from(config.listing_path.as_str()),
        }
    }

    /// Connects Postgres (running migrations) and, if configured, NATS.
    pub async fn connect(config: &AppConfig) -> crate::Result<Self> {
        let db = PgPoolOptions::new().max_connections(config.db_max_connections).connect(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&db).await?;
        let events: Arc<dyn EventPublisher> = match &config.nats_url {
            Some(url) => Arc::new(NatsPublisher::connect(url).await?),
            None => Arc::new(NoopPublisher),
        };
        Ok(Self::new(config, Arc::new(PgProductSource::new(db.clone())), Arc::new(PgUserRepository::new(db)), events))
    }
}
