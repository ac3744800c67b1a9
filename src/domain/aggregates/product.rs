//! Product Aggregate
//!
//! Catalog data is read-only from the storefront's point of view; the
//! product fetch collaborator owns it.

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Money, MoneyError};

pub type ProductId = i64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Money,
    /// Absolute amount taken off `price`.
    pub discount: Money,
    pub description: String,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub category: String,
    pub image: String,
}

impl Product {
    /// Selling price shown on the detail page: `price - discount`.
    pub fn discounted_price(&self) -> Result<Money, MoneyError> { self.price.subtract(&self.discount) }

    pub fn has_discount(&self) -> bool { !self.discount.is_zero() }
}

#[cfg(test)]
pub(crate) fn sample(id: ProductId, title: &str, price: i64) -> Product {
    use rust_decimal::Decimal;
    Product {
        id, title: title.into(), price: Money::usd(Decimal::from(price)), discount: Money::zero("USD"),
        description: format!("{title} description"), brand: "Acme".into(), model: "M1".into(),
        color: "black".into(), category: "gadgets".into(), image: format!("https://img.example/{id}.png"),
    }
}
