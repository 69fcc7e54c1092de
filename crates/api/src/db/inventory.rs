//! Inventory repository: holdings granted by checkout.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use golden_market_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{InventoryHolding, InventoryItem, Product};

/// Internal row type for the inventory/product join.
#[derive(Debug, sqlx::FromRow)]
struct InventoryItemRow {
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    acquired_at: DateTime<Utc>,
    holding_updated_at: DateTime<Utc>,
    name: String,
    description: String,
    category: String,
    price: i64,
    stock: i32,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryItemRow> for InventoryItem {
    fn from(row: InventoryItemRow) -> Self {
        Self {
            holding: InventoryHolding {
                user_id: UserId::new(row.user_id),
                product_id: ProductId::new(row.product_id),
                quantity: row.quantity,
                acquired_at: row.acquired_at,
                updated_at: row.holding_updated_at,
            },
            product: Product::from(ProductRow {
                id: row.product_id,
                name: row.name,
                description: row.description,
                category: row.category,
                price: row.price,
                stock: row.stock,
                is_available: row.is_available,
                created_at: row.created_at,
                updated_at: row.updated_at,
            }),
        }
    }
}

/// Repository for inventory database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    /// Add `quantity` of a product to the user's holdings (upsert).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_holding(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO inventory (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = inventory.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// List a user's holdings with product details, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<Vec<InventoryItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, InventoryItemRow>(
            r"
            SELECT i.user_id, i.product_id, i.quantity, i.acquired_at,
                   i.updated_at AS holding_updated_at,
                   p.name, p.description, p.category, p.price, p.stock,
                   p.is_available, p.created_at, p.updated_at
            FROM inventory i
            JOIN products p ON i.product_id = p.id
            WHERE i.user_id = $1
            ORDER BY i.acquired_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }
}
