//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod user;

pub use product::{Product, ProductId};
pub use order::{Order, OrderLine};
pub use cart::{Cart, CartError, CartItem};
pub use user::{PurchaseHistory, UserProfile};
