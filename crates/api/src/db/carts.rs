//! Cart repository.
//!
//! The cart is single-writer per user in practice and is not lock-protected:
//! checkout reads a snapshot outside its transaction and re-validates
//! against locked product and balance rows.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use golden_market_core::{CartLineId, ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{CartItem, CartSummary, Product};

/// Internal row type for the cart/product join.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    line_id: Uuid,
    quantity: i32,
    id: Uuid,
    name: String,
    description: String,
    category: String,
    price: i64,
    stock: i32,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let product = Product::from(ProductRow {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            stock: row.stock,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        });

        Self::priced(CartLineId::new(row.line_id), product, row.quantity).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("cart line {} subtotal overflows", row.line_id))
        })
    }
}

/// Repository for cart database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartRepository;

impl CartRepository {
    /// Read the user's cart joined with current product data, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` if a total overflows.
    pub async fn snapshot(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<CartSummary, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id AS line_id, ci.quantity,
                   p.id, p.name, p.description, p.category, p.price, p.stock,
                   p.is_available, p.created_at, p.updated_at
            FROM cart_items ci
            JOIN products p ON ci.product_id = p.id
            WHERE ci.user_id = $1
            ORDER BY ci.added_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        let items = rows
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        CartSummary::from_items(items)
            .ok_or_else(|| RepositoryError::DataCorruption("cart total overflows".to_string()))
    }

    /// Add a product to the cart, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user or product
    /// does not exist.
    pub async fn add(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartLineId, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            r"
            INSERT INTO cart_items (id, user_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(CartLineId::generate())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(conn)
        .await?;

        Ok(CartLineId::new(id))
    }

    /// Set the quantity of one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not belong to the user.
    pub async fn update_quantity(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items
            SET quantity = $1, updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            ",
        )
        .bind(quantity)
        .bind(line_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not belong to the user.
    pub async fn remove(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        line_id: CartLineId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(line_id)
            .bind(user_id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete every line in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}
