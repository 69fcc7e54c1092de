//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKET_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MARKET_HOST` - Bind address (default: 127.0.0.1)
//! - `MARKET_PORT` - Listen port (default: 3000)
//! - `MARKET_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `CHECKOUT_DUPLICATE_WINDOW_SECS` - Same-total resubmissions within this
//!   window return the earlier order (default: 15)
//! - `CHECKOUT_TIMEOUT_SECS` - Upper bound on one checkout (default: 10)
//! - `CHECKOUT_LOCK_TIMEOUT_MS` - Row-lock wait limit inside checkout (default: 5000)
//! - `RATE_LIMIT_REPLENISH_SECS` - Seconds per replenished token, per client;
//!   larger values are stricter (default: 1)
//! - `RATE_LIMIT_BURST` - Burst size per client (default: 50)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::CheckoutSettings;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace application configuration.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Checkout tunables
    pub checkout: CheckoutConfig,
    /// Per-client request limits
    pub rate_limit: RateLimitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Checkout timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub duplicate_window: Duration,
    pub timeout: Duration,
    pub lock_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            duplicate_window: Duration::from_secs(15),
            timeout: Duration::from_secs(10),
            lock_timeout: Duration::from_millis(5000),
        }
    }
}

impl CheckoutConfig {
    /// Settings for the checkout orchestrator.
    #[must_use]
    pub const fn settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            duplicate_window: self.duplicate_window,
            timeout: self.timeout,
        }
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// One token is replenished every `replenish_secs` seconds.
    pub replenish_secs: u64,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            replenish_secs: 1,
            burst_size: 50,
        }
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MARKET_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("MARKET_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("MARKET_PORT", "3000")?;
        let db_max_connections = parse_env_or_default::<u32>("MARKET_DB_MAX_CONNECTIONS", "10")?;

        let checkout = CheckoutConfig::from_env()?;
        let rate_limit = RateLimitConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            checkout,
            rate_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let duplicate_window = parse_env_or_default::<u64>("CHECKOUT_DUPLICATE_WINDOW_SECS", "15")?;
        let timeout = parse_env_or_default::<u64>("CHECKOUT_TIMEOUT_SECS", "10")?;
        let lock_timeout = parse_env_or_default::<u64>("CHECKOUT_LOCK_TIMEOUT_MS", "5000")?;

        if timeout == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CHECKOUT_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            duplicate_window: Duration::from_secs(duplicate_window),
            timeout: Duration::from_secs(timeout),
            lock_timeout: Duration::from_millis(lock_timeout),
        })
    }
}

impl RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let replenish_secs = parse_env_or_default::<u64>("RATE_LIMIT_REPLENISH_SECS", "1")?;
        let burst_size = parse_env_or_default::<u32>("RATE_LIMIT_BURST", "50")?;

        // governor rejects a zero period or burst
        if replenish_secs == 0 || burst_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "RATE_LIMIT_REPLENISH_SECS/RATE_LIMIT_BURST".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            replenish_secs,
            burst_size,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
