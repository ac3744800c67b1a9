//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::order::OrderLine;
use crate::domain::aggregates::product::{Product, ProductId};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::totals::{self, CartTotals};
use crate::domain::value_objects::{Money, MoneyError};

/// Line in the cart: the product's catalog fields plus a quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// A missing quantity counts as zero in every total.
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl CartItem {
    pub fn id(&self) -> ProductId { self.product.id }
    pub fn display_subtotal(&self) -> Money { totals::display_subtotal(self) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Product {product_id} is priced in {found}, cart is in {expected}")]
    CurrencyMismatch { product_id: ProductId, expected: String, found: String },
}

/// Client-session cart. Each product id appears at most once and every
/// line is priced in the cart's currency.
///
/// Every mutator returns whether the cart actually changed so the owning
/// store knows when to notify subscribers.
#[derive(Clone, Debug)]
pub struct Cart {
    currency: String,
    items: Vec<CartItem>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { currency: currency.to_uppercase(), items: vec![], updated_at: Utc::now(), events: vec![] }
    }

    pub fn currency(&self) -> &str { &self.currency }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item(&self, id: ProductId) -> Option<&CartItem> { self.items.iter().find(|i| i.id() == id) }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn totals(&self) -> Result<CartTotals, MoneyError> { CartTotals::of(&self.items, &self.currency) }

    pub fn add_item(&mut self, product: &Product) -> Result<bool, CartError> {
        if product.price.currency() != self.currency {
            return Err(CartError::CurrencyMismatch {
                product_id: product.id, expected: self.currency.clone(), found: product.price.currency().to_string(),
            });
        }
        let quantity = if let Some(existing) = self.items.iter_mut().find(|i| i.id() == product.id) {
            let q = existing.quantity.unwrap_or(0).saturating_add(1);
            existing.quantity = Some(q);
            q
        } else {
            self.items.push(CartItem { product: product.clone(), quantity: Some(1) });
            1
        };
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded { product_id: product.id, quantity }));
        self.touch();
        Ok(true)
    }

    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        if self.items.len() == before { return false; }
        self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { product_id: id }));
        self.touch();
        true
    }

    pub fn add_quantity(&mut self, id: ProductId) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id() == id) else { return false };
        let q = item.quantity.unwrap_or(0).saturating_add(1);
        item.quantity = Some(q);
        self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged { product_id: id, quantity: q }));
        self.touch();
        true
    }

    /// Decrements the quantity; an item that would drop below one is removed.
    pub fn subtract_quantity(&mut self, id: ProductId) -> bool {
        let Some(current) = self.item(id).map(|i| i.quantity.unwrap_or(0)) else { return false };
        if current <= 1 { return self.remove_item(id); }
        if let Some(item) = self.items.iter_mut().find(|i| i.id() == id) { item.quantity = Some(current - 1); }
        self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged { product_id: id, quantity: current - 1 }));
        self.touch();
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() { return false; }
        let items = self.items.len();
        self.items.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared { items }));
        self.touch();
        true
    }

    /// Takes the ordered quantities out of the cart.
    ///
    /// Lines and units added after the order snapshot stay; a line drops
    /// out once nothing of it is left.
    pub fn remove_ordered(&mut self, lines: &[OrderLine]) -> bool {
        let before = self.items.clone();
        for line in lines {
            let Some(item) = self.items.iter_mut().find(|i| i.id() == line.id) else { continue };
            item.quantity = Some(item.quantity.unwrap_or(0).saturating_sub(line.quantity));
        }
        self.items.retain(|i| i.quantity.unwrap_or(0) > 0 || !lines.iter().any(|l| l.id == i.id()));
        if self.items == before { return false; }
        self.raise_event(DomainEvent::Cart(CartEvent::CheckedOut { lines: lines.len(), remaining: self.items.len() }));
        self.touch();
        true
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
