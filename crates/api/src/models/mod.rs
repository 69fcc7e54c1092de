//! Domain models for the marketplace.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`].

pub mod cart;
pub mod inventory;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartItem, CartSummary};
pub use inventory::{InventoryHolding, InventoryItem};
pub use order::{Order, OrderLine};
pub use product::{NewProduct, Product};
pub use user::UserAccount;
