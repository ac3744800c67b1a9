//! Adapters for the ports in [`crate::ports`].
pub mod memory;
pub mod nats;
pub mod postgres;

pub use memory::{EventLog, InMemoryUserRepository, StaticProductSource};
pub use nats::{NatsPublisher, NoopPublisher};
pub use postgres::{PgProductSource, PgUserRepository};
