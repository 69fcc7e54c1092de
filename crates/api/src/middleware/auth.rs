//! Caller identity extractor.
//!
//! Authentication happens upstream: the gateway verifies the caller and
//! forwards their user id in the `x-user-id` header. Requests without a
//! parseable id are rejected before reaching a handler.

use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};

use golden_market_core::UserId;

use crate::error::AppError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user_id): RequireUser) -> impl IntoResponse {
///     format!("Hello, {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized(format!("missing or invalid {USER_ID_HEADER}")))?;

        sentry::configure_scope(|scope| {
            scope.set_user(Some(sentry::User {
                id: Some(user_id.to_string()),
                ..Default::default()
            }));
        });

        Ok(Self(user_id))
    }
}

/// Parse the caller's user id from request headers.
#[must_use]
pub fn user_id_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<UserId>().ok())
}
