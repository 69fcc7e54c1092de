//! Checkout against a real database: row locks, rollback, and the
//! duplicate-submission window.
//!
//! Run with: cargo test -p golden-market-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use golden_market_api::db::OrderRepository;
use golden_market_api::models::Order;
use golden_market_api::services::{CheckoutError, CheckoutSettings, OrderService};
use golden_market_core::{Coins, OrderStatus};
use golden_market_integration_tests::TestDb;

fn no_duplicate_window() -> CheckoutSettings {
    CheckoutSettings {
        duplicate_window: Duration::ZERO,
        ..CheckoutSettings::default()
    }
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_checkout_commits_every_effect() {
    let db = TestDb::new().await;
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 30, 5).await;
    let apple = db.product("Apple", 5, 10).await;
    db.add_to_cart(user, lantern, 2).await;
    db.add_to_cart(user, apple, 3).await;

    let order = db
        .checkout(CheckoutSettings::default())
        .create_order(user)
        .await
        .unwrap();

    assert_eq!(order.total_amount, Coins::new(75));
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.lines.len(), 2);
    assert_eq!(order.lines_total(), Some(order.total_amount));

    assert_eq!(db.balance(user).await, Coins::new(25));
    assert_eq!(db.stock(lantern).await, 3);
    assert_eq!(db.stock(apple).await, 7);
    assert_eq!(db.cart_len(user).await, 0);

    let stored = OrderService::new(&db.pool)
        .get_order(user, order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.order_number, order.order_number);
    assert_eq!(stored.lines.len(), 2);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_failed_line_leaves_nothing_behind() {
    let db = TestDb::new().await;
    let user = db.user(500).await;
    let lantern = db.product("Lantern", 30, 5).await;
    let cloak = db.product("Cloak", 100, 1).await;
    db.add_to_cart(user, lantern, 1).await;
    db.add_to_cart(user, cloak, 1).await;

    // Someone else buys the cloak between cart edit and checkout.
    sqlx::query("UPDATE products SET stock = 0 WHERE id = $1")
        .bind(cloak)
        .execute(&db.pool)
        .await
        .unwrap();

    let err = db
        .checkout(CheckoutSettings::default())
        .create_order(user)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::InsufficientStock { available: 0, requested: 1, .. }
    ));
    assert_eq!(db.balance(user).await, Coins::new(500));
    assert_eq!(db.stock(lantern).await, 5);
    assert_eq!(db.cart_len(user).await, 2);
    assert_eq!(db.order_count(user).await, 0);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_resubmission_returns_first_order() {
    let db = TestDb::new().await;
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 30, 5).await;
    let service = db.checkout(CheckoutSettings::default());

    db.add_to_cart(user, lantern, 1).await;
    let first = service.create_order(user).await.unwrap();

    // Same cart contents again, inside the window.
    db.add_to_cart(user, lantern, 1).await;
    let second = service.create_order(user).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(db.balance(user).await, Coins::new(70));
    assert_eq!(db.order_count(user).await, 1);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_concurrent_submissions_create_one_order() {
    let db = TestDb::new().await;
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 60, 5).await;
    db.add_to_cart(user, lantern, 1).await;
    let service = db.checkout(CheckoutSettings::default());

    let (a, b) = tokio::join!(service.create_order(user), service.create_order(user));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.id, b.id);
    assert_eq!(db.balance(user).await, Coins::new(40));
    assert_eq!(db.stock(lantern).await, 4);
    assert_eq!(db.order_count(user).await, 1);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_concurrent_checkouts_cannot_overspend() {
    let db = TestDb::new().await;
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 60, 5).await;
    db.add_to_cart(user, lantern, 1).await;
    let service = db.checkout(no_duplicate_window());

    let (a, b) = tokio::join!(service.create_order(user), service.create_order(user));
    let results = [a, b];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(CheckoutError::InsufficientFunds { .. } | CheckoutError::EmptyCart)
    )));
    assert_eq!(db.balance(user).await, Coins::new(40));
    assert_eq!(db.order_count(user).await, 1);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_concurrent_checkouts_cannot_oversell() {
    let db = TestDb::new().await;
    let cloak = db.product("Cloak", 50, 1).await;
    let service = db.checkout(CheckoutSettings::default());

    let mut users = Vec::new();
    for _ in 0..4 {
        let user = db.user(100).await;
        db.add_to_cart(user, cloak, 1).await;
        users.push(user);
    }

    let handles: Vec<_> = users
        .iter()
        .map(|&user| {
            let service = service.clone();
            tokio::spawn(async move { service.create_order(user).await })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(err) => assert!(
                matches!(err, CheckoutError::InsufficientStock { available: 0, .. }),
                "unexpected error: {err}"
            ),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(db.stock(cloak).await, 0);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_deadline_exceeded_while_user_row_locked() {
    let db = TestDb::new().await;
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 30, 5).await;
    db.add_to_cart(user, lantern, 1).await;
    let service = db.checkout(CheckoutSettings::default());

    let mut blocker = db.pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let err = service
        .create_order_within(user, Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::DeadlineExceeded));

    blocker.rollback().await.unwrap();

    assert_eq!(db.balance(user).await, Coins::new(100));
    assert_eq!(db.order_count(user).await, 0);

    let order = service.create_order(user).await.unwrap();
    assert_eq!(order.total_amount, Coins::new(30));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_empty_cart_rejected() {
    let db = TestDb::new().await;
    let user = db.user(100).await;

    let err = db
        .checkout(CheckoutSettings::default())
        .create_order(user)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_recent_orders_window_follows_order_timestamps() {
    let db = TestDb::new().await;
    let user = db.user(100).await;
    let mut tx = db.pool.begin().await.unwrap();

    // Transaction time is frozen at the first statement.
    sqlx::query("SELECT NOW()").execute(&mut *tx).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    let now = Utc::now();
    let stale = Order::completed(user, Coins::new(10), now - TimeDelta::seconds(2));
    let fresh = Order::completed(user, Coins::new(20), now);
    OrderRepository.create(&mut *tx, &stale).await.unwrap();
    OrderRepository.create(&mut *tx, &fresh).await.unwrap();

    let recent = OrderRepository
        .find_recent_by_user(&mut *tx, user, Duration::from_secs(1))
        .await
        .unwrap();

    let ids: Vec<_> = recent.iter().map(|order| order.id).collect();
    assert_eq!(ids, vec![fresh.id]);
}
