//! Order repository.
//!
//! Orders and their lines are append-only: nothing here updates or deletes.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use golden_market_core::{
    Coins, OrderId, OrderLineId, OrderNumber, OrderStatus, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

const ORDER_COLUMNS: &str =
    "id, user_id, order_number, total_amount, status, created_at, updated_at";

const ORDER_LINE_COLUMNS: &str =
    "id, order_id, product_id, product_name, quantity, price_per_unit, subtotal, created_at";

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    order_number: String,
    total_amount: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            order_number: OrderNumber::from_stored(self.order_number),
            total_amount: Coins::new(self.total_amount),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            lines,
        }
    }
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    price_per_unit: i64,
    subtotal: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderLineId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            price_per_unit: Coins::new(row.price_per_unit),
            subtotal: Coins::new(row.subtotal),
            created_at: row.created_at,
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderRepository;

impl OrderRepository {
    /// Insert an order header. Lines are written separately with
    /// [`Self::create_line`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on an order-number collision.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        order: &Order,
    ) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            r"
            INSERT INTO orders ({ORDER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "
        ))
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.order_number)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Insert one order line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the order or product is missing.
    pub async fn create_line(
        &self,
        conn: &mut PgConnection,
        line: &OrderLine,
    ) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            r"
            INSERT INTO order_items ({ORDER_LINE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "
        ))
        .bind(line.id)
        .bind(line.order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.price_per_unit)
        .bind(line.subtotal)
        .bind(line.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Orders placed by the user within the trailing `window`, newest first,
    /// with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_recent_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
        window: Duration,
    ) -> Result<Vec<Order>, RepositoryError> {
        // `created_at` is stamped by the application, so the cutoff must be too.
        let cutoff = TimeDelta::from_std(window)
            .ok()
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE user_id = $1 AND created_at > $2
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(&mut *conn)
        .await?;

        self.attach_lines(conn, rows).await
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(
        &self,
        conn: &mut PgConnection,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => {
                let lines = self.lines_for_order(conn, id).await?;
                Ok(Some(row.into_order(lines)))
            }
            None => Ok(None),
        }
    }

    /// All of a user's orders, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        self.attach_lines(conn, rows).await
    }

    /// Lines of one order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_order(
        &self,
        conn: &mut PgConnection,
        order_id: OrderId,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "SELECT {ORDER_LINE_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    /// Load lines for several orders in one query and attach them.
    async fn attach_lines(
        &self,
        conn: &mut PgConnection,
        rows: Vec<OrderRow>,
    ) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            r"
            SELECT {ORDER_LINE_COLUMNS} FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY created_at, id
            "
        ))
        .bind(&ids)
        .fetch_all(conn)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for line in line_rows {
            by_order.entry(line.order_id).or_default().push(line.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let lines = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect())
    }
}
