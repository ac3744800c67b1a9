//! Application services: cart sessions, checkout and catalog lookup.
pub mod cart_store;
pub mod catalog;
pub mod checkout;
pub mod confirmation;
pub mod session;

pub use cart_store::CartStore;
pub use catalog::{Catalog, CatalogState, Lookup};
pub use checkout::{CheckoutError, CheckoutService};
pub use session::{CartSession, PanelState, SessionRegistry};
