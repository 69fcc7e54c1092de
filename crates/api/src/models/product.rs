//! Product catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use golden_market_core::{Coins, ProductId};

/// A product in the marketplace.
///
/// `stock` is a ledger: it only ever moves through a conditional decrement
/// and never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Coins,
    pub stock: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product (seeding and admin tooling).
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Coins,
    pub stock: i32,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}
