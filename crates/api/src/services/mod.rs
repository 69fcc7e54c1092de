//! Business logic services.
//!
//! # Services
//!
//! - `checkout` - Converts a cart into an order in one transaction
//! - `cart` - Cart edits with availability and stock checks
//! - `orders` - Order history for the calling user
//! - `inventory` - Holdings granted by checkout

pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod orders;

pub use cart::{CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService, CheckoutSettings, PgCheckoutStore};
pub use inventory::InventoryService;
pub use orders::OrderService;
