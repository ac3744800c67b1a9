//! OpenSASE Storefront
//!
//! Cart, checkout and catalog lookup for a small storefront.
//!
//! ## Features
//! - Per-session cart store with subscribable state
//! - Derived cart totals and per-line display subtotals
//! - Checkout that records the order on the user profile
//! - Product lookup by route id with not-found redirects

use thiserror::Error;

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Event bus error: {0}")]
    Events(#[from] ports::PublishError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
