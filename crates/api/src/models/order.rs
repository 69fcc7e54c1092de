//! Order types.
//!
//! Orders are immutable once their checkout transaction commits. Lines carry
//! a denormalized copy of the product name and unit price so historical
//! orders stay stable when the catalog changes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use golden_market_core::{Coins, OrderId, OrderLineId, OrderNumber, OrderStatus, ProductId, UserId};

/// A committed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: OrderNumber,
    pub total_amount: Coins,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Start a completed order with no lines yet.
    #[must_use]
    pub fn completed(user_id: UserId, total_amount: Coins, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::generate(),
            user_id,
            order_number: OrderNumber::generate(now),
            total_amount,
            status: OrderStatus::Completed,
            created_at: now,
            updated_at: now,
            lines: Vec::new(),
        }
    }

    /// Sum of line subtotals, or `None` on overflow.
    #[must_use]
    pub fn lines_total(&self) -> Option<Coins> {
        self.lines
            .iter()
            .try_fold(Coins::ZERO, |acc, line| acc.checked_add(line.subtotal))
    }
}

/// A single product within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price_per_unit: Coins,
    pub subtotal: Coins,
    pub created_at: DateTime<Utc>,
}
