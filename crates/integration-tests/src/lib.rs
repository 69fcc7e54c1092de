//! Integration tests for Golden Market.
//!
//! # Running Tests
//!
//! ```bash
//! # Docker must be running; each test starts its own PostgreSQL container
//! cargo test -p golden-market-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout` - The checkout transaction against real row locks
//! - `api` - HTTP routes over a migrated database

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::Router;
use secrecy::SecretString;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;

use golden_market_api::config::{CheckoutConfig, MarketConfig, RateLimitConfig};
use golden_market_api::db::{CartRepository, MIGRATOR, ProductRepository, UserRepository};
use golden_market_api::models::NewProduct;
use golden_market_api::services::{CheckoutService, CheckoutSettings, PgCheckoutStore};
use golden_market_api::state::AppState;
use golden_market_core::{Coins, ProductId, UserId};

/// A migrated database in a throwaway container.
///
/// The container stops when this value is dropped.
pub struct TestDb {
    pub pool: PgPool,
    pub url: String,
    _container: ContainerAsync<PostgresImage>,
}

impl TestDb {
    /// Start PostgreSQL and apply all migrations.
    pub async fn new() -> Self {
        let container = PostgresImage::default()
            .with_user("market_test")
            .with_password("market_test_password")
            .with_db_name("market_test")
            .start()
            .await
            .unwrap();

        let host = std::env::var("TESTCONTAINERS_HOST_OVERRIDE")
            .unwrap_or_else(|_| "localhost".to_string());
        let port = container.get_host_port_ipv4(5432).await.unwrap();
        let url = format!("postgresql://market_test:market_test_password@{host}:{port}/market_test");

        let pool = golden_market_api::db::create_pool(&SecretString::from(url.clone()), 16)
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();

        Self {
            pool,
            url,
            _container: container,
        }
    }

    /// Insert a user with a unique name.
    pub async fn user(&self, balance: i64) -> UserId {
        let mut conn = self.pool.acquire().await.unwrap();
        let username = format!("user-{}", UserId::generate());
        UserRepository
            .create(&mut conn, &username, Coins::new(balance))
            .await
            .unwrap()
            .id
    }

    /// Insert an available product.
    pub async fn product(&self, name: &str, price: i64, stock: i32) -> ProductId {
        let mut conn = self.pool.acquire().await.unwrap();
        let product = NewProduct {
            name: name.to_string(),
            description: String::new(),
            category: "general".to_string(),
            price: Coins::new(price),
            stock,
            is_available: true,
        };
        ProductRepository.create(&mut conn, &product).await.unwrap().id
    }

    /// Put `quantity` of a product in a user's cart.
    pub async fn add_to_cart(&self, user_id: UserId, product_id: ProductId, quantity: i32) {
        let mut conn = self.pool.acquire().await.unwrap();
        CartRepository
            .add(&mut conn, user_id, product_id, quantity)
            .await
            .unwrap();
    }

    pub async fn balance(&self, user_id: UserId) -> Coins {
        let mut conn = self.pool.acquire().await.unwrap();
        UserRepository
            .get_by_id(&mut conn, user_id)
            .await
            .unwrap()
            .unwrap()
            .balance
    }

    pub async fn stock(&self, product_id: ProductId) -> i32 {
        let mut conn = self.pool.acquire().await.unwrap();
        ProductRepository
            .get_by_id(&mut conn, product_id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    pub async fn cart_len(&self, user_id: UserId) -> usize {
        let mut conn = self.pool.acquire().await.unwrap();
        CartRepository
            .snapshot(&mut conn, user_id)
            .await
            .unwrap()
            .items
            .len()
    }

    pub async fn order_count(&self, user_id: UserId) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// A checkout service over this database.
    pub fn checkout(&self, settings: CheckoutSettings) -> CheckoutService<PgCheckoutStore> {
        let store = PgCheckoutStore::new(self.pool.clone(), Duration::from_secs(5));
        CheckoutService::new(store, settings)
    }

    /// The full HTTP application over this database.
    pub fn app(&self) -> Router {
        let config = MarketConfig {
            database_url: SecretString::from(self.url.clone()),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            db_max_connections: 16,
            checkout: CheckoutConfig::default(),
            rate_limit: RateLimitConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        golden_market_api::app(AppState::new(config, self.pool.clone()))
    }
}
