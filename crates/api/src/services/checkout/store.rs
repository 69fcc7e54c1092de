//! Storage seam for the checkout orchestrator.
//!
//! [`CheckoutStore`] covers the reads made before the transaction opens;
//! [`CheckoutTx`] is one open transaction. Dropping a `CheckoutTx` without
//! calling [`CheckoutTx::commit`] must discard every write made through it.

use std::time::Duration;

use async_trait::async_trait;

use golden_market_core::{Coins, ProductId, UserId};

use crate::db::{LedgerError, RepositoryError};
use crate::models::{CartSummary, Order, OrderLine, Product, UserAccount};

#[async_trait]
pub trait CheckoutStore: Send + Sync {
    type Tx: CheckoutTx;

    /// Current cart lines with resolved prices, read without locks.
    async fn cart_snapshot(&self, user_id: UserId) -> Result<CartSummary, RepositoryError>;

    /// The user's orders created within the trailing `window`, newest first.
    async fn recent_orders(
        &self,
        user_id: UserId,
        window: Duration,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// Open a transaction.
    async fn begin(&self) -> Result<Self::Tx, RepositoryError>;
}

#[async_trait]
pub trait CheckoutTx: Send {
    /// Lock the user row until commit or rollback.
    async fn lock_user(&mut self, user_id: UserId) -> Result<Option<UserAccount>, RepositoryError>;

    /// Same as [`CheckoutStore::recent_orders`], seen from inside the transaction.
    async fn recent_orders(
        &mut self,
        user_id: UserId,
        window: Duration,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// Lock a product row until commit or rollback.
    async fn lock_product(&mut self, product_id: ProductId)
    -> Result<Option<Product>, RepositoryError>;

    /// Debit the balance; fails with `LedgerError::Insufficient` rather than
    /// going negative.
    async fn deduct_balance(&mut self, user_id: UserId, amount: Coins) -> Result<(), LedgerError>;

    /// Decrement stock; fails with `LedgerError::Insufficient` rather than
    /// going negative.
    async fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), LedgerError>;

    async fn insert_order(&mut self, order: &Order) -> Result<(), RepositoryError>;

    async fn insert_order_line(&mut self, line: &OrderLine) -> Result<(), RepositoryError>;

    async fn add_holding(
        &mut self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError>;

    async fn clear_cart(&mut self, user_id: UserId) -> Result<(), RepositoryError>;

    async fn commit(self) -> Result<(), RepositoryError>;
}
