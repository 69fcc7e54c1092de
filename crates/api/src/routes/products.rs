//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use golden_market_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

/// GET /api/products
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let mut conn = state.pool().acquire().await.map_err(RepositoryError::from)?;
    let products = ProductRepository
        .list_available(&mut conn, query.category.as_deref())
        .await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
///
/// Unavailable products are still returned, with `is_available: false`.
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>> {
    let mut conn = state.pool().acquire().await.map_err(RepositoryError::from)?;
    let product = ProductRepository
        .get_by_id(&mut conn, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    Ok(Json(product))
}
