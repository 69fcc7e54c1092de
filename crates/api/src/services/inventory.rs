//! Inventory queries.

use sqlx::PgPool;

use golden_market_core::UserId;

use crate::db::{InventoryRepository, RepositoryError};
use crate::models::InventoryItem;

/// Read side of a user's holdings.
pub struct InventoryService<'a> {
    pool: &'a PgPool,
    inventory: InventoryRepository,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            inventory: InventoryRepository,
        }
    }

    /// Everything the user owns, most recently acquired first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<InventoryItem>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        self.inventory.list_for_user(&mut conn, user_id).await
    }
}
