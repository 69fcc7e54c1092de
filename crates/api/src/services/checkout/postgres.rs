//! `PostgreSQL` implementation of the checkout storage seam.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use golden_market_core::{Coins, ProductId, UserId};

use super::store::{CheckoutStore, CheckoutTx};
use crate::db::{
    self, CartRepository, InventoryRepository, LedgerError, OrderRepository, ProductRepository,
    RepositoryError, UserRepository,
};
use crate::models::{CartSummary, Order, OrderLine, Product, UserAccount};

/// Checkout storage backed by a connection pool.
#[derive(Debug, Clone)]
pub struct PgCheckoutStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgCheckoutStore {
    /// Create a store whose transactions wait at most `lock_timeout` for a row lock.
    #[must_use]
    pub const fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

#[async_trait]
impl CheckoutStore for PgCheckoutStore {
    type Tx = PgCheckoutTx;

    async fn cart_snapshot(&self, user_id: UserId) -> Result<CartSummary, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        CartRepository.snapshot(&mut conn, user_id).await
    }

    async fn recent_orders(
        &self,
        user_id: UserId,
        window: Duration,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        OrderRepository
            .find_recent_by_user(&mut conn, user_id, window)
            .await
    }

    async fn begin(&self) -> Result<PgCheckoutTx, RepositoryError> {
        let tx = db::begin_with_lock_timeout(&self.pool, self.lock_timeout).await?;
        Ok(PgCheckoutTx { tx })
    }
}

/// An open checkout transaction. Dropped without commit, it rolls back.
#[derive(Debug)]
pub struct PgCheckoutTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
    async fn lock_user(&mut self, user_id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        UserRepository.get_for_update(&mut self.tx, user_id).await
    }

    async fn recent_orders(
        &mut self,
        user_id: UserId,
        window: Duration,
    ) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository
            .find_recent_by_user(&mut self.tx, user_id, window)
            .await
    }

    async fn lock_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        ProductRepository
            .get_for_update(&mut self.tx, product_id)
            .await
    }

    async fn deduct_balance(&mut self, user_id: UserId, amount: Coins) -> Result<(), LedgerError> {
        UserRepository
            .deduct_balance(&mut self.tx, user_id, amount)
            .await
    }

    async fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), LedgerError> {
        ProductRepository
            .decrement_stock(&mut self.tx, product_id, quantity)
            .await
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), RepositoryError> {
        OrderRepository.create(&mut self.tx, order).await
    }

    async fn insert_order_line(&mut self, line: &OrderLine) -> Result<(), RepositoryError> {
        OrderRepository.create_line(&mut self.tx, line).await
    }

    async fn add_holding(
        &mut self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        InventoryRepository
            .add_holding(&mut self.tx, user_id, product_id, quantity)
            .await
    }

    async fn clear_cart(&mut self, user_id: UserId) -> Result<(), RepositoryError> {
        CartRepository.clear(&mut self.tx, user_id).await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
