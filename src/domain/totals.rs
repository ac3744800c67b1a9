//! Derived cart figures.
//!
//! Everything here is a pure function of the current items; nothing is
//! cached, the figures are recomputed from the item slice on every read.

use serde::Serialize;

use crate::domain::aggregates::CartItem;
use crate::domain::value_objects::{Money, MoneyError};

/// Sum of quantities, a missing quantity counting as zero.
pub fn total_items(items: &[CartItem]) -> u64 {
    items.iter().map(|i| u64::from(i.quantity.unwrap_or(0))).sum()
}

/// Sum of `price * quantity`, a missing quantity counting as zero.
///
/// A line priced in another currency is an error, never skipped.
pub fn total_price(items: &[CartItem], currency: &str) -> Result<Money, MoneyError> {
    items.iter().try_fold(Money::zero(currency), |acc, i| acc.add(&line_total(i)))
}

/// `price * quantity` with a missing quantity counting as zero.
pub fn line_total(item: &CartItem) -> Money {
    item.product.price.multiply(item.quantity.unwrap_or(0))
}

/// Subtotal shown next to a cart line.
///
/// Falls back to the unit price when the quantity is zero or missing, so it
/// does not always agree with [`line_total`].
pub fn display_subtotal(item: &CartItem) -> Money {
    match item.quantity {
        Some(q) if q > 0 => item.product.price.multiply(q),
        _ => item.product.price.clone(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_price: Money,
}

impl CartTotals {
    pub fn of(items: &[CartItem], currency: &str) -> Result<Self, MoneyError> {
        Ok(Self { total_items: total_items(items), total_price: total_price(items, currency)? })
    }
}
