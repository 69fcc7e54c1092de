//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::MarketConfig;
use crate::services::{CheckoutService, PgCheckoutStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketConfig,
    pool: PgPool,
    checkout: CheckoutService<PgCheckoutStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Marketplace configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: MarketConfig, pool: PgPool) -> Self {
        let store = PgCheckoutStore::new(pool.clone(), config.checkout.lock_timeout);
        let checkout = CheckoutService::new(store, config.checkout.settings());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                checkout,
            }),
        }
    }

    /// Get a reference to the marketplace configuration.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService<PgCheckoutStore> {
        &self.inner.checkout
    }
}
