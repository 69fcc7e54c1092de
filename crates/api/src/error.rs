//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Responses are JSON: `{"error": "<message>", "code": "<code>"}`, plus a
//! `details` object for errors that carry structured data.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{CartError, CheckoutError};

/// Application-level error type for the marketplace API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Checkout did not produce an order.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Cart edit was rejected or failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller identity missing or invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    /// Whether this error is a server fault rather than a client problem.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Checkout(err) => !err.is_business(),
            Self::Cart(err) => matches!(err, CartError::Repository(_)),
            _ => false,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        if self.is_internal() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }

        match self {
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::UserNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::CONFLICT,
            },
            Self::Cart(err) => match err {
                CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::ProductNotFound | CartError::LineNotFound | CartError::UnknownUser => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::CONFLICT,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        if self.is_internal() {
            return "internal_error";
        }

        match self {
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "empty_cart",
                CheckoutError::UserNotFound(_) => "user_not_found",
                CheckoutError::InsufficientFunds { .. } => "insufficient_funds",
                CheckoutError::InsufficientStock { .. } => "insufficient_stock",
                CheckoutError::ProductUnavailable { .. } => "product_unavailable",
                CheckoutError::DeadlineExceeded | CheckoutError::Storage(_) => "internal_error",
            },
            Self::Cart(err) => match err {
                CartError::InvalidQuantity(_) => "invalid_quantity",
                CartError::ProductNotFound => "product_not_found",
                CartError::ProductUnavailable(_) => "product_unavailable",
                CartError::InsufficientStock { .. } => "insufficient_stock",
                CartError::LineNotFound => "cart_item_not_found",
                CartError::UnknownUser => "user_not_found",
                CartError::Repository(_) => "internal_error",
            },
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::BadRequest(_) => "bad_request",
            _ => "internal_error",
        }
    }

    /// The message shown to clients; internal details are never exposed.
    fn public_message(&self) -> String {
        if self.is_internal() {
            return INTERNAL_MESSAGE.to_string();
        }

        match self {
            Self::Checkout(err) => err.to_string(),
            Self::Cart(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            _ => INTERNAL_MESSAGE.to_string(),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            Self::Checkout(
                err @ CheckoutError::InsufficientStock {
                    product_id,
                    product_name,
                    available,
                    requested,
                },
            ) => Some(json!({
                "product_id": product_id,
                "product_name": product_name,
                "available": available,
                "requested": requested,
                "shortfall": err.shortfall(),
            })),
            Self::Checkout(CheckoutError::InsufficientFunds {
                available,
                required,
            }) => Some(json!({
                "available": available,
                "required": required,
            })),
            Self::Checkout(CheckoutError::ProductUnavailable {
                product_id,
                product_name,
            }) => Some(json!({
                "product_id": product_id,
                "product_name": product_name,
            })),
            _ => None,
        }
    }

    /// Build the JSON body sent to the client.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.public_message(),
            code: self.code(),
            details: self.details(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
