//! HTTP middleware for the marketplace API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request tracing)
//! 3. Rate limiting (governor, keyed by caller)

pub mod auth;
pub mod rate_limit;

pub use auth::{RequireUser, USER_ID_HEADER};
pub use rate_limit::{ClientKey, ClientKeyExtractor, RateLimiterLayer, rate_limiter};
