//! Domain events
use crate::domain::aggregates::ProductId;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event")]
pub enum DomainEvent {
    Cart(CartEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CartEvent {
    ItemAdded { product_id: ProductId, quantity: u32 },
    ItemRemoved { product_id: ProductId },
    QuantityChanged { product_id: ProductId, quantity: u32 },
    Cleared { items: usize },
    /// Ordered quantities taken out after checkout; `remaining` lines were added meanwhile.
    CheckedOut { lines: usize, remaining: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    Placed { order_id: String, user_id: String, total: Decimal, lines: usize },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Cart(CartEvent::ItemAdded { .. }) => "storefront.cart.item_added",
            Self::Cart(CartEvent::ItemRemoved { .. }) => "storefront.cart.item_removed",
            Self::Cart(CartEvent::QuantityChanged { .. }) => "storefront.cart.quantity_changed",
            Self::Cart(CartEvent::Cleared { .. }) => "storefront.cart.cleared",
            Self::Cart(CartEvent::CheckedOut { .. }) => "storefront.cart.checked_out",
            Self::Order(OrderEvent::Placed { .. }) => "storefront.order.placed",
        }
    }
}
