//! Order history queries.

use sqlx::PgPool;

use golden_market_core::{OrderId, UserId};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::Order;

/// Read side of orders, scoped to the calling user.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository,
        }
    }

    /// Get one of the user's orders with its lines.
    ///
    /// Orders belonging to someone else are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let order = self.orders.get_by_id(&mut conn, order_id).await?;

        Ok(order.filter(|order| order.user_id == user_id))
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        self.orders.get_by_user(&mut conn, user_id).await
    }
}
