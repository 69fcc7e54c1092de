//! Cart types.

use serde::Serialize;

use golden_market_core::{CartLineId, Coins};

use super::Product;

/// A cart line joined with its product.
///
/// The cart never stores a price; `subtotal` is resolved from the product at
/// read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub line_id: CartLineId,
    pub product: Product,
    pub quantity: i32,
    pub subtotal: Coins,
}

impl CartItem {
    /// Price a cart line against its product.
    ///
    /// Returns `None` if the subtotal overflows.
    #[must_use]
    pub fn priced(line_id: CartLineId, product: Product, quantity: i32) -> Option<Self> {
        let subtotal = product.price.checked_mul_quantity(quantity)?;
        Some(Self {
            line_id,
            product,
            quantity,
            subtotal,
        })
    }
}

/// A point-in-time view of a user's cart with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total_items: i64,
    pub total_price: Coins,
}

impl CartSummary {
    /// Build a summary from priced items.
    ///
    /// Returns `None` if the total overflows.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Option<Self> {
        let mut total_price = Coins::ZERO;
        let mut total_items: i64 = 0;

        for item in &items {
            total_price = total_price.checked_add(item.subtotal)?;
            total_items = total_items.checked_add(i64::from(item.quantity))?;
        }

        Some(Self {
            items,
            total_items,
            total_price,
        })
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use golden_market_core::ProductId;

    use super::*;

    fn product(price: i64) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Lantern".to_string(),
            description: String::new(),
            category: "tools".to_string(),
            price: Coins::new(price),
            stock: 10,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let items = vec![
            CartItem::priced(CartLineId::generate(), product(30), 2).unwrap(),
            CartItem::priced(CartLineId::generate(), product(5), 3).unwrap(),
        ];

        let summary = CartSummary::from_items(items).unwrap();
        assert_eq!(summary.total_price, Coins::new(75));
        assert_eq!(summary.total_items, 5);
    }

    #[test]
    fn test_priced_overflow() {
        assert!(CartItem::priced(CartLineId::generate(), product(i64::MAX), 2).is_none());
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::from_items(Vec::new());
        assert!(summary.is_some_and(|s| s.is_empty() && s.total_price == Coins::ZERO));
    }
}
