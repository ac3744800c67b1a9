//! Shared cart store.
//!
//! The store is the only mutation surface for a session's cart. Readers
//! either take a snapshot or subscribe and get woken on every effective
//! change; no-op mutations (unknown id, clearing an empty cart) do not
//! notify.

use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::aggregates::{Cart, CartError, CartItem, OrderLine, Product, ProductId};
use crate::domain::events::DomainEvent;
use crate::domain::totals::CartTotals;
use crate::domain::value_objects::MoneyError;

#[derive(Clone, Debug)]
pub struct CartStore {
    state: Arc<watch::Sender<Cart>>,
}

impl CartStore {
    pub fn new(currency: &str) -> Self {
        let (state, _) = watch::channel(Cart::new(currency));
        Self { state: Arc::new(state) }
    }

    /// Adds one unit of `product`, merging with an existing line. A product
    /// priced in another currency leaves the cart untouched.
    pub fn add_item(&self, product: &Product) -> Result<Vec<DomainEvent>, CartError> {
        self.try_mutate(|cart| cart.add_item(product))
    }
    pub fn remove_item(&self, id: ProductId) -> Vec<DomainEvent> { self.mutate(|cart| cart.remove_item(id)) }
    pub fn add_quantity(&self, id: ProductId) -> Vec<DomainEvent> { self.mutate(|cart| cart.add_quantity(id)) }
    pub fn subtract_quantity(&self, id: ProductId) -> Vec<DomainEvent> { self.mutate(|cart| cart.subtract_quantity(id)) }
    pub fn clear_cart(&self) -> Vec<DomainEvent> { self.mutate(Cart::clear) }
    pub fn remove_ordered(&self, lines: &[OrderLine]) -> Vec<DomainEvent> { self.mutate(|cart| cart.remove_ordered(lines)) }

    pub fn items(&self) -> Vec<CartItem> { self.state.borrow().items().to_vec() }
    pub fn snapshot(&self) -> Cart { self.state.borrow().clone() }
    pub fn totals(&self) -> Result<CartTotals, MoneyError> { self.state.borrow().totals() }
    pub fn is_empty(&self) -> bool { self.state.borrow().is_empty() }
    pub fn subscribe(&self) -> watch::Receiver<Cart> { self.state.subscribe() }

    fn mutate(&self, f: impl FnOnce(&mut Cart) -> bool) -> Vec<DomainEvent> {
        match self.try_mutate::<Infallible>(|cart| Ok(f(cart))) {
            Ok(events) => events,
            Err(never) => match never {},
        }
    }

    fn try_mutate<E>(&self, f: impl FnOnce(&mut Cart) -> Result<bool, E>) -> Result<Vec<DomainEvent>, E> {
        let mut events = Vec::new();
        let mut outcome = Ok(());
        self.state.send_if_modified(|cart| match f(cart) {
            Ok(changed) => {
                events = cart.take_events();
                changed
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome.map(|()| events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::sample;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_store_mutations() {
        let store = CartStore::new("USD");
        let events = store.add_item(&sample(1, "Widget", 10)).unwrap();
        assert_eq!(events.len(), 1);
        store.add_item(&sample(2, "Gadget", 5)).unwrap();
        store.add_quantity(1);
        let totals = store.totals().unwrap();
        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.total_price.amount(), Decimal::new(25, 0));
        assert!(store.remove_item(404).is_empty());
        store.clear_cart();
        assert!(store.is_empty());
        assert!(store.clear_cart().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_currency_add_does_not_notify() {
        let store = CartStore::new("EUR");
        let mut rx = store.subscribe();
        assert!(matches!(store.add_item(&sample(1, "Widget", 10)), Err(CartError::CurrencyMismatch { .. })));
        assert!(!rx.has_changed().unwrap());
        assert!(store.totals().unwrap().total_price.is_zero());
    }

    #[tokio::test]
    async fn test_subscribers_see_effective_changes_only() {
        let store = CartStore::new("USD");
        let mut rx = store.subscribe();
        store.add_item(&sample(1, "Widget", 10)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().items().len(), 1);
        store.remove_item(99);
        store.subtract_quantity(99);
        assert!(!rx.has_changed().unwrap());
        store.subtract_quantity(1);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = CartStore::new("USD");
        let other = store.clone();
        other.add_item(&sample(7, "Lamp", 3)).unwrap();
        assert_eq!(store.items().len(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op { Add(i64), Remove(i64), Inc(i64), Dec(i64) }

    fn op() -> impl Strategy<Value = Op> {
        let id = 1i64..5;
        prop_oneof![
            id.clone().prop_map(Op::Add),
            id.clone().prop_map(Op::Remove),
            id.clone().prop_map(Op::Inc),
            id.prop_map(Op::Dec),
        ]
    }

    proptest! {
        #[test]
        fn repeated_adds_merge_into_one_line(n in 1usize..50) {
            let store = CartStore::new("USD");
            let p = sample(42, "Same", 2);
            for _ in 0..n { store.add_item(&p).unwrap(); }
            let items = store.items();
            prop_assert_eq!(items.len(), 1);
            prop_assert_eq!(items[0].quantity, Some(n as u32));
        }

        #[test]
        fn totals_track_quantities(ops in proptest::collection::vec(op(), 0..60)) {
            let store = CartStore::new("USD");
            for op in ops {
                match op {
                    Op::Add(id) => { store.add_item(&sample(id, "p", id * 3)).unwrap(); }
                    Op::Remove(id) => { store.remove_item(id); }
                    Op::Inc(id) => { store.add_quantity(id); }
                    Op::Dec(id) => { store.subtract_quantity(id); }
                }
            }
            let items = store.items();
            let quantities: u64 = items.iter().map(|i| u64::from(i.quantity.unwrap_or(0))).sum();
            let price: Decimal = items.iter().map(|i| Decimal::from(i.id() * 3) * Decimal::from(i.quantity.unwrap_or(0))).sum();
            prop_assert!(items.iter().all(|i| i.quantity.unwrap_or(0) >= 1));
            let mut ids: Vec<_> = items.iter().map(CartItem::id).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), items.len());
            let totals = store.totals().unwrap();
            prop_assert_eq!(totals.total_items, quantities);
            prop_assert_eq!(totals.total_price.amount(), price);
        }
    }
}
