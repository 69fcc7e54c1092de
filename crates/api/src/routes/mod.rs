//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET    /api/products           - Available products (?category=)
//! GET    /api/products/{id}      - Product detail
//!
//! # Account (requires x-user-id)
//! GET    /api/me                 - Caller's account and balance
//!
//! # Cart (requires x-user-id)
//! GET    /api/cart               - Cart summary
//! POST   /api/cart               - Add product {product_id, quantity}
//! PATCH  /api/cart/{line_id}     - Set quantity {quantity}
//! DELETE /api/cart/{line_id}     - Remove line
//!
//! # Orders (requires x-user-id)
//! POST   /api/orders             - Checkout
//! GET    /api/orders             - Order history
//! GET    /api/orders/{id}        - Order detail
//!
//! # Inventory (requires x-user-id)
//! GET    /api/inventory          - Holdings
//! ```

pub mod account;
pub mod cart;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/{line_id}", patch(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
}

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(account::show))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .route("/inventory", get(inventory::index))
}

/// Create all routes for the marketplace.
///
/// The rate limiter, when given, applies to `/api` only; health checks are
/// never limited.
pub fn routes(rate_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let api = match rate_limiter {
        Some(layer) => api_routes().layer(layer),
        None => api_routes(),
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}
