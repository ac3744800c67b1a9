//! Catalog state and product lookup by route id.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::domain::aggregates::{Product, ProductId};
use crate::ports::ProductSource;

pub const DEFAULT_LISTING_PATH: &str = "/productos";

/// The three things a page reads from the product fetch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogState {
    pub products: Option<Vec<Product>>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for CatalogState {
    fn default() -> Self { Self { products: None, is_loading: true, error: None } }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    /// Fetch still in flight; show a placeholder.
    Loading,
    /// Fetch failed or produced nothing; show the error page.
    Failed(String),
    Found(Product),
    /// Loaded fine but no such product; navigate to the listing.
    Redirect(String),
}

/// Integer-prefix parse of a route segment.
///
/// Leading whitespace and one sign are accepted, a `0x` prefix switches to
/// hex, and parsing stops at the first non-digit. No digits at all gives
/// `None`.
pub fn parse_route_id(raw: &str) -> Option<ProductId> {
    let s = raw.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, s) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).map_or((10, s), |rest| (16, rest));
    let end = s.find(|c: char| !c.is_digit(radix)).unwrap_or(s.len());
    let digits = s.get(..end).filter(|d| !d.is_empty())?;
    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

pub fn lookup(route_id: &str, state: &CatalogState, listing_path: &str) -> Lookup {
    if state.is_loading { return Lookup::Loading; }
    if let Some(err) = &state.error { return Lookup::Failed(err.clone()); }
    let Some(products) = &state.products else { return Lookup::Failed("catalog not available".into()) };
    parse_route_id(route_id)
        .and_then(|id| products.iter().find(|p| p.id == id))
        .map_or_else(|| Lookup::Redirect(listing_path.to_string()), |p| Lookup::Found(p.clone()))
}

/// Holds the fetched catalog and lets readers watch it load.
///
/// Only products priced in the store currency are kept, so anything found
/// here can go into a cart.
pub struct Catalog {
    source: Arc<dyn ProductSource>,
    currency: String,
    state: watch::Sender<CatalogState>,
}

impl Catalog {
    pub fn new(source: Arc<dyn ProductSource>, currency: &str) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self { source, currency: currency.to_uppercase(), state }
    }

    pub fn currency(&self) -> &str { &self.currency }

    pub fn state(&self) -> CatalogState { self.state.borrow().clone() }
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> { self.state.subscribe() }

    /// Product with `id`, if the catalog has loaded and contains it.
    pub fn find(&self, id: ProductId) -> Option<Product> {
        self.state.borrow().products.as_ref()?.iter().find(|p| p.id == id).cloned()
    }

    pub fn lookup(&self, route_id: &str, listing_path: &str) -> Lookup { lookup(route_id, &self.state.borrow(), listing_path) }

    /// Fetches once. There is no retry; a failure is kept in the state.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        self.state.send_modify(|s| { s.is_loading = true; s.error = None; });
        match self.source.fetch_products().await {
            Ok(products) => {
                let products = self.in_store_currency(products);
                info!(count = products.len(), "Catalog loaded");
                self.state.send_replace(CatalogState { products: Some(products), is_loading: false, error: None });
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed");
                self.state.send_replace(CatalogState { products: None, is_loading: false, error: Some(e.to_string()) });
            }
        }
    }

    fn in_store_currency(&self, products: Vec<Product>) -> Vec<Product> {
        products
            .into_iter()
            .filter(|p| {
                let keep = p.price.currency() == self.currency && p.discount.currency() == self.currency;
                if !keep {
                    warn!(product_id = p.id, price = %p.price, discount = %p.discount, currency = %self.currency, "Dropping product priced in another currency");
                }
                keep
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::sample;
    use crate::domain::value_objects::Money;
    use crate::infrastructure::memory::StaticProductSource;
    use rust_decimal::Decimal;

    fn loaded(products: Vec<Product>) -> CatalogState {
        CatalogState { products: Some(products), is_loading: false, error: None }
    }

    #[test]
    fn test_parse_route_id() {
        assert_eq!(parse_route_id("42"), Some(42));
        assert_eq!(parse_route_id("  42abc"), Some(42));
        assert_eq!(parse_route_id("-3"), Some(-3));
        assert_eq!(parse_route_id("+7"), Some(7));
        assert_eq!(parse_route_id("0x1f"), Some(31));
        assert_eq!(parse_route_id("abc"), None);
        assert_eq!(parse_route_id(""), None);
        assert_eq!(parse_route_id("-"), None);
    }

    #[test]
    fn test_lookup_found() {
        let state = loaded(vec![sample(42, "TV", 300)]);
        assert!(matches!(lookup("42", &state, DEFAULT_LISTING_PATH), Lookup::Found(p) if p.id == 42));
    }

    #[test]
    fn test_lookup_missing_redirects() {
        let state = loaded(vec![sample(42, "TV", 300)]);
        assert_eq!(lookup("99", &state, DEFAULT_LISTING_PATH), Lookup::Redirect("/productos".into()));
        assert_eq!(lookup("nope", &state, "/products"), Lookup::Redirect("/products".into()));
    }

    #[test]
    fn test_lookup_loading_and_failure() {
        assert_eq!(lookup("42", &CatalogState::default(), DEFAULT_LISTING_PATH), Lookup::Loading);
        let failed = CatalogState { products: None, is_loading: false, error: Some("boom".into()) };
        assert_eq!(lookup("42", &failed, DEFAULT_LISTING_PATH), Lookup::Failed("boom".into()));
        let empty = CatalogState { products: None, is_loading: false, error: None };
        assert!(matches!(lookup("42", &empty, DEFAULT_LISTING_PATH), Lookup::Failed(_)));
    }

    #[tokio::test]
    async fn test_catalog_load() {
        let catalog = Catalog::new(Arc::new(StaticProductSource::new(vec![sample(1, "Lamp", 3)])), "USD");
        assert!(catalog.state().is_loading);
        assert!(catalog.find(1).is_none());
        catalog.load().await;
        assert!(!catalog.state().is_loading);
        assert_eq!(catalog.find(1).map(|p| p.title), Some("Lamp".to_string()));
        assert!(matches!(catalog.lookup("1", DEFAULT_LISTING_PATH), Lookup::Found(_)));
    }

    #[tokio::test]
    async fn test_catalog_keeps_store_currency_only() {
        let mut euro = sample(2, "Kettle", 20);
        euro.price = Money::new(Decimal::from(20), "EUR");
        let mut mixed = sample(3, "Toaster", 30);
        mixed.discount = Money::new(Decimal::from(5), "EUR");
        let catalog = Catalog::new(Arc::new(StaticProductSource::new(vec![sample(1, "Lamp", 3), euro, mixed])), "usd");
        catalog.load().await;
        assert_eq!(catalog.currency(), "USD");
        assert!(catalog.find(1).is_some());
        assert!(catalog.find(2).is_none());
        assert!(catalog.find(3).is_none());
        assert_eq!(catalog.lookup("2", DEFAULT_LISTING_PATH), Lookup::Redirect("/productos".into()));
    }

    #[tokio::test]
    async fn test_lowercase_currency_in_feed_matches_store() {
        let feed = serde_json::json!([{
            "id": 5, "title": "Radio",
            "price": {"amount": "12.50", "currency": "usd"},
            "discount": {"amount": "0", "currency": "usd"},
            "description": "", "brand": "Acme", "model": "R", "color": "grey", "category": "audio", "image": "/img/5.png"
        }]);
        let products: Vec<Product> = serde_json::from_value(feed).unwrap();
        let catalog = Catalog::new(Arc::new(StaticProductSource::new(products)), "USD");
        catalog.load().await;
        let radio = catalog.find(5).unwrap();
        let cart = crate::application::CartStore::new("USD");
        cart.add_item(&radio).unwrap();
        assert_eq!(cart.totals().unwrap().total_price, Money::usd(Decimal::new(1250, 2)));
    }

    #[tokio::test]
    async fn test_catalog_load_failure_is_kept() {
        let catalog = Catalog::new(Arc::new(StaticProductSource::failing("api down")), "USD");
        catalog.load().await;
        let state = catalog.state();
        assert!(state.products.is_none());
        assert!(state.error.unwrap().contains("api down"));
        assert!(matches!(catalog.lookup("1", DEFAULT_LISTING_PATH), Lookup::Failed(_)));
    }
}
