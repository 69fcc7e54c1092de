//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use golden_market_core::{CartLineId, ProductId};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::CartSummary;
use crate::services::CartService;
use crate::state::AppState;

/// Body for adding a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Body for changing a cart line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// GET /api/cart
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<CartSummary>> {
    let cart = CartService::new(state.pool()).get_cart(user_id).await?;
    Ok(Json(cart))
}

/// POST /api/cart
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartSummary>)> {
    let cart = CartService::new(state.pool())
        .add_item(user_id, request.product_id, request.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// PATCH /api/cart/{line_id}
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(line_id): Path<CartLineId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartSummary>> {
    let cart = CartService::new(state.pool())
        .update_quantity(user_id, line_id, request.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/cart/{line_id}
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(line_id): Path<CartLineId>,
) -> Result<Json<CartSummary>> {
    let cart = CartService::new(state.pool())
        .remove_item(user_id, line_id)
        .await?;
    Ok(Json(cart))
}
