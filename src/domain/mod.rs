//! Domain layer: catalog, cart, order and user aggregates.
pub mod aggregates;
pub mod events;
pub mod totals;
pub mod value_objects;
