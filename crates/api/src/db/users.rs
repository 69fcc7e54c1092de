//! User repository: account lookups and the balance ledger.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use golden_market_core::{Coins, UserId};

use super::{LedgerError, RepositoryError};
use crate::models::UserAccount;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    balance: i64,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            balance: Coins::new(row.balance),
            created_at: row.created_at,
        }
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Get a user by ID without locking.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        conn: &mut PgConnection,
        id: UserId,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, balance, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(UserAccount::from))
    }

    /// Lock a user row for the rest of the transaction and return the
    /// current balance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, including a
    /// lock-wait timeout or deadlock abort.
    pub async fn get_for_update(
        &self,
        conn: &mut PgConnection,
        id: UserId,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, balance, created_at FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(UserAccount::from))
    }

    /// Deduct `amount` coins if the balance covers it.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Insufficient` if no row matched (missing user or
    /// balance too low), `LedgerError::Repository` if the update fails.
    pub async fn deduct_balance(
        &self,
        conn: &mut PgConnection,
        id: UserId,
        amount: Coins,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            "UPDATE users SET balance = balance - $2 WHERE id = $1 AND balance >= $2",
        )
        .bind(id)
        .bind(amount)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::Insufficient);
        }

        Ok(())
    }

    /// Credit `amount` coins to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn credit_balance(
        &self,
        conn: &mut PgConnection,
        id: UserId,
        amount: Coins,
    ) -> Result<Coins, RepositoryError> {
        let balance: i64 = sqlx::query_scalar(
            "UPDATE users SET balance = balance + $2 WHERE id = $1 RETURNING balance",
        )
        .bind(id)
        .bind(amount)
        .fetch_one(conn)
        .await?;

        Ok(Coins::new(balance))
    }

    /// Create a user with an opening balance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        username: &str,
        balance: Coins,
    ) -> Result<UserAccount, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, username, balance)
            VALUES ($1, $2, $3)
            RETURNING id, username, balance, created_at
            ",
        )
        .bind(UserId::generate())
        .bind(username)
        .bind(balance)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }
}
