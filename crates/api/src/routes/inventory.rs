//! Inventory route handlers.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::InventoryItem;
use crate::services::InventoryService;
use crate::state::AppState;

/// GET /api/inventory
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<InventoryItem>>> {
    let items = InventoryService::new(state.pool()).list(user_id).await?;
    Ok(Json(items))
}
