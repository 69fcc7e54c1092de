//! Database operations for the marketplace `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - Accounts and their coin balance ledger
//! - `products` - Catalog and the stock ledger
//! - `cart_items` - Pending selections, one row per (user, product)
//! - `orders` / `order_items` - Append-only committed purchases
//! - `inventory` - Products a user owns after checkout
//!
//! Repositories take a `&mut PgConnection`, so the same query runs against a
//! pooled connection or inside a caller's transaction (`&mut *tx`).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p golden-market-cli -- migrate
//! ```

pub mod carts;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::error::ErrorKind;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

pub use carts::CartRepository;
pub use inventory::InventoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Scopes `lock_timeout` to the current transaction.
const SET_LOCK_TIMEOUT_SQL: &str = "SELECT set_config('lock_timeout', $1, true)";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced row does not exist.
    #[error("related resource not found")]
    InvalidReference,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(|db| db.kind()) {
            Some(ErrorKind::UniqueViolation) => Self::Conflict(error.to_string()),
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            _ => Self::Database(error),
        }
    }
}

/// Errors from a conditional ledger decrement (stock or balance).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The guarded `UPDATE` matched no row: the ledger would have gone negative.
    #[error("insufficient ledger amount")]
    Insufficient,

    /// The update itself failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for LedgerError {
    fn from(error: sqlx::Error) -> Self {
        Self::Repository(error.into())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Begin a transaction whose row-lock waits give up after `lock_timeout`.
///
/// # Errors
///
/// Returns an error when starting the transaction or setting the timeout fails.
pub async fn begin_with_lock_timeout(
    pool: &PgPool,
    lock_timeout: Duration,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(SET_LOCK_TIMEOUT_SQL)
        .bind(format!("{}ms", lock_timeout.as_millis()))
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
