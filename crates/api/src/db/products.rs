//! Product repository: catalog reads and the stock ledger.
//!
//! Stock only moves through [`ProductRepository::decrement_stock`], whose
//! `WHERE stock >= $2` guard keeps the ledger non-negative even if a caller
//! skipped the locked read.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use golden_market_core::{Coins, ProductId};

use super::{LedgerError, RepositoryError};
use crate::models::{NewProduct, Product};

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, price, stock, is_available, created_at, updated_at";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    pub(super) id: Uuid,
    pub(super) name: String,
    pub(super) description: String,
    pub(super) category: String,
    pub(super) price: i64,
    pub(super) stock: i32,
    pub(super) is_available: bool,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            price: Coins::new(row.price),
            stock: row.stock,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductRepository;

impl ProductRepository {
    /// Get a product by ID without locking it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        conn: &mut PgConnection,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Lock a product row for the rest of the transaction and return its
    /// current state.
    ///
    /// Must be called on a connection inside an open transaction; on a bare
    /// connection the lock is released as soon as the statement ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, including a
    /// lock-wait timeout or deadlock abort.
    pub async fn get_for_update(
        &self,
        conn: &mut PgConnection,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Decrement stock if at least `quantity` remains.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Insufficient` if no row matched (missing product
    /// or not enough stock), `LedgerError::Repository` if the update fails.
    pub async fn decrement_stock(
        &self,
        conn: &mut PgConnection,
        id: ProductId,
        quantity: i32,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            ",
        )
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::Insufficient);
        }

        Ok(())
    }

    /// List available products, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(
        &self,
        conn: &mut PgConnection,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE is_available AND ($1::VARCHAR IS NULL OR category = $1)
            ORDER BY name ASC
            "
        ))
        .bind(category)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including the
    /// non-negative price/stock checks).
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (id, name, description, category, price, stock, is_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(ProductId::generate())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.is_available)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }
}
