//! Order Aggregate
//!
//! An order is a snapshot of the cart taken at checkout. It is built once
//! and never mutated afterwards, so it only exposes getters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::cart::CartItem;
use crate::domain::aggregates::product::ProductId;
use crate::domain::totals;
use crate::domain::value_objects::{Money, MoneyError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: String,
    #[serde(rename = "date")]
    created_at: DateTime<Utc>,
    products: Vec<OrderLine>,
    total: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine { pub id: ProductId, pub title: String, pub price: Money, pub quantity: u32 }

impl Order {
    /// Snapshots `items`. The id is `now` in Unix milliseconds.
    pub fn from_items(items: &[CartItem], currency: &str, now: DateTime<Utc>) -> Result<Self, MoneyError> {
        let products = items.iter().map(|i| OrderLine {
            id: i.id(), title: i.product.title.clone(), price: i.product.price.clone(), quantity: i.quantity.unwrap_or(0),
        }).collect();
        let total = totals::total_price(items, currency)?;
        Ok(Self { id: now.timestamp_millis().to_string(), created_at: now, products, total })
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn products(&self) -> &[OrderLine] { &self.products }
    pub fn total(&self) -> &Money { &self.total }
}
