//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Requests are keyed by the caller's user id when the gateway supplied
//! one, otherwise by client IP. Requests with neither share one bucket.
//! The limiter is built from configuration and owned by the router that
//! installs it.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use golden_market_core::UserId;

use super::auth::user_id_from_headers;
use crate::config::RateLimitConfig;

/// Identity a request is rate limited under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKey {
    User(UserId),
    Ip(IpAddr),
    Anonymous,
}

/// Key extractor: user id header first, then proxy-forwarded client IP.
#[derive(Debug, Clone, Copy)]
pub struct ClientKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientKeyExtractor {
    type Key = ClientKey;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        if let Some(user_id) = user_id_from_headers(headers) {
            return Ok(ClientKey::User(user_id));
        }

        // Try X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ClientKey::Ip(ip));
        }

        // Try X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ClientKey::Ip(ip));
        }

        Ok(ClientKey::Anonymous)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the per-client API rate limiter.
///
/// Returns `None` if the configuration has a zero period or burst.
#[must_use]
pub fn rate_limiter(config: &RateLimitConfig) -> Option<RateLimiterLayer> {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientKeyExtractor)
        .per_second(config.replenish_secs) // period between tokens, not a rate
        .burst_size(config.burst_size)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(governor)))
}
