//! Checkout error taxonomy.

use thiserror::Error;

use golden_market_core::{Coins, ProductId, UserId};

use crate::db::RepositoryError;

/// Why a checkout did not produce an order.
///
/// Business variants describe the caller's cart or account and are safe to
/// show verbatim. `DeadlineExceeded` and `Storage` are internal.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("insufficient coins: have {available}, need {required}")]
    InsufficientFunds { available: Coins, required: Coins },

    #[error("insufficient stock for {product_name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i32,
        requested: i32,
    },

    #[error("{product_name} is no longer available")]
    ProductUnavailable {
        product_id: ProductId,
        product_name: String,
    },

    #[error("checkout did not finish before its deadline")]
    DeadlineExceeded,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl CheckoutError {
    /// Whether the error describes the caller's request rather than a fault.
    #[must_use]
    pub const fn is_business(&self) -> bool {
        !matches!(self, Self::DeadlineExceeded | Self::Storage(_))
    }

    /// Units missing for an `InsufficientStock` error.
    #[must_use]
    pub const fn shortfall(&self) -> Option<i32> {
        match self {
            Self::InsufficientStock {
                available,
                requested,
                ..
            } => Some(requested.saturating_sub(*available)),
            _ => None,
        }
    }
}
