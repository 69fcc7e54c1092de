//! Inventory holdings: what a user owns after checkout.

use chrono::{DateTime, Utc};
use serde::Serialize;

use golden_market_core::{ProductId, UserId};

use super::Product;

/// Quantity of a product owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryHolding {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub acquired_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A holding with product details for display.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    #[serde(flatten)]
    pub holding: InventoryHolding,
    pub product: Product,
}
