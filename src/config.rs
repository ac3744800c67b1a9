//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `NATS_URL` - enables domain event publishing
//! - `PORT` - listen port (default: 8083)
//! - `STORE_CURRENCY` - ISO currency of the catalog (default: USD)
//! - `CONFIRMATION_DELAY_MS` - how long the purchase confirmation stays up (default: 2000)
//! - `PURCHASE_HISTORY` - `append` or `replace` (default: append)
//! - `CATALOG_LISTING_PATH` - redirect target for unknown products (default: /productos)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 10)
//! - `SESSION_IDLE_TIMEOUT_SECS` - cart sessions untouched for this long are dropped (default: 1800)

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::application::catalog::DEFAULT_LISTING_PATH;
use crate::domain::aggregates::PurchaseHistory;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {key}: {value}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub nats_url: Option<String>,
    pub port: u16,
    pub currency: String,
    pub confirmation_delay: Duration,
    pub purchase_history: PurchaseHistory,
    pub listing_path: String,
    pub db_max_connections: u32,
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL").filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".into()))?;
        let currency = get("STORE_CURRENCY").unwrap_or_else(|| "USD".into()).to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid { key: "STORE_CURRENCY".into(), value: currency });
        }
        let listing_path = get("CATALOG_LISTING_PATH").unwrap_or_else(|| DEFAULT_LISTING_PATH.into());
        if !listing_path.starts_with('/') {
            return Err(ConfigError::Invalid { key: "CATALOG_LISTING_PATH".into(), value: listing_path });
        }
        Ok(Self {
            database_url,
            nats_url: get("NATS_URL").filter(|v| !v.is_empty()),
            port: parse_or(&get, "PORT", 8083)?,
            currency,
            confirmation_delay: Duration::from_millis(parse_or(&get, "CONFIRMATION_DELAY_MS", 2000)?),
            purchase_history: parse_or(&get, "PURCHASE_HISTORY", PurchaseHistory::Append)?,
            listing_path,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
            session_idle_timeout: Duration::from_secs(parse_or(&get, "SESSION_IDLE_TIMEOUT_SECS", 1800)?),
        })
    }
}

fn parse_or<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key: key.into(), value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[("DATABASE_URL", "postgres://localhost/store")]).unwrap();
        assert_eq!(c.port, 8083);
        assert_eq!(c.currency, "USD");
        assert_eq!(c.confirmation_delay, Duration::from_secs(2));
        assert_eq!(c.purchase_history, PurchaseHistory::Append);
        assert_eq!(c.listing_path, "/productos");
        assert_eq!(c.db_max_connections, 10);
        assert_eq!(c.session_idle_timeout, Duration::from_secs(1800));
        assert!(c.nats_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("DATABASE_URL", "postgres://db"), ("PORT", "9000"), ("STORE_CURRENCY", "eur"),
            ("PURCHASE_HISTORY", "replace"), ("CONFIRMATION_DELAY_MS", "500"), ("NATS_URL", "nats://bus:4222"),
        ]).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.currency, "EUR");
        assert_eq!(c.purchase_history, PurchaseHistory::Replace);
        assert_eq!(c.confirmation_delay, Duration::from_millis(500));
        assert_eq!(c.nats_url.as_deref(), Some("nats://bus:4222"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::MissingEnvVar("DATABASE_URL".into()));
        assert!(matches!(config(&[("DATABASE_URL", "x"), ("PORT", "http")]), Err(ConfigError::Invalid { key, .. }) if key == "PORT"));
        assert!(matches!(config(&[("DATABASE_URL", "x"), ("PURCHASE_HISTORY", "merge")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(config(&[("DATABASE_URL", "x"), ("CATALOG_LISTING_PATH", "productos")]), Err(ConfigError::Invalid { .. })));
    }
}
