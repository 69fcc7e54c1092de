//! Account route handlers.

use axum::{Json, extract::State};

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::UserAccount;
use crate::state::AppState;

/// GET /api/me
///
/// The caller's account, including the current coin balance.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<UserAccount>> {
    let mut conn = state.pool().acquire().await.map_err(RepositoryError::from)?;
    let account = UserRepository
        .get_by_id(&mut conn, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;
    Ok(Json(account))
}
