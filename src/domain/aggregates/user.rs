//! User profile, owned by the user-data collaborator.
//!
//! The storefront only ever touches `purchases`; every other field is
//! carried through untouched, including ones this crate does not model.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::domain::aggregates::order::Order;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub purchases: Vec<Order>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// How a new order is merged into `purchases`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PurchaseHistory {
    /// Keep earlier orders and push the new one.
    #[default]
    Append,
    /// Replace the whole list with the new order.
    Replace,
}

impl FromStr for PurchaseHistory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown purchase history policy `{other}`")),
        }
    }
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), email: email.into(), purchases: vec![], extra: serde_json::Map::new() }
    }

    /// Returns a copy of the profile with `order` merged in.
    pub fn with_purchase(&self, order: Order, policy: PurchaseHistory) -> Self {
        let mut updated = self.clone();
        match policy {
            PurchaseHistory::Append => updated.purchases.push(order),
            PurchaseHistory::Replace => updated.purchases = vec![order],
        }
        updated
    }
}
