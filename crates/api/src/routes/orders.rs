//! Order route handlers: checkout and history.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use golden_market_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::services::OrderService;
use crate::state::AppState;

/// POST /api/orders
///
/// Checks out the caller's cart. A resubmission inside the duplicate window
/// returns the order created by the first submission.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.checkout().create_order(user_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_orders(user_id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool())
        .get_order(user_id, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
    Ok(Json(order))
}
