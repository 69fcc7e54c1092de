//! HTTP routes over a migrated database.
//!
//! Run with: cargo test -p golden-market-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use golden_market_api::middleware::USER_ID_HEADER;
use golden_market_core::{ProductId, UserId};
use golden_market_integration_tests::TestDb;

async fn send(app: &Router, method: Method, uri: &str, user: UserId, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user.to_string());

    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_cart_to_order_flow() {
    let db = TestDb::new().await;
    let app = db.app();
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 30, 5).await;

    let (status, products) = send(&app, Method::GET, "/api/products", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products.as_array().unwrap().len(), 1);

    let (status, cart) = send(
        &app,
        Method::POST,
        "/api/cart",
        user,
        Some(json!({"product_id": lantern, "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cart["total_price"], 60);

    let (status, order) = send(&app, Method::POST, "/api/orders", user, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total_amount"], 60);
    assert_eq!(order["status"], "completed");

    let order_uri = format!("/api/orders/{}", order["id"].as_str().unwrap());
    let (status, fetched) = send(&app, Method::GET, &order_uri, user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["order_number"], order["order_number"]);

    let (status, inventory) = send(&app, Method::GET, "/api/inventory", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inventory[0]["quantity"], 2);

    let (_, cart) = send(&app, Method::GET, "/api/cart", user, None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_checkout_errors_are_structured() {
    let db = TestDb::new().await;
    let app = db.app();
    let user = db.user(10).await;
    let lantern = db.product("Lantern", 30, 5).await;

    let (status, body) = send(&app, Method::POST, "/api/orders", user, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "empty_cart");

    db.add_to_cart(user, lantern, 1).await;
    let (status, body) = send(&app, Method::POST, "/api/orders", user, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "insufficient_funds");
    assert_eq!(body["details"]["available"], 10);
    assert_eq!(body["details"]["required"], 30);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_cart_rejects_more_than_stock() {
    let db = TestDb::new().await;
    let app = db.app();
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 30, 2).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cart",
        user,
        Some(json!({"product_id": lantern, "quantity": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "insufficient_stock");
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_other_users_order_is_not_found() {
    let db = TestDb::new().await;
    let app = db.app();
    let owner = db.user(100).await;
    let stranger = db.user(100).await;
    let lantern = db.product("Lantern", 30, 5).await;
    db.add_to_cart(owner, lantern, 1).await;

    let (_, order) = send(&app, Method::POST, "/api/orders", owner, None).await;
    let order_uri = format!("/api/orders/{}", order["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::GET, &order_uri, stranger, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_account_balance_reflects_checkout() {
    let db = TestDb::new().await;
    let app = db.app();
    let user = db.user(100).await;
    let lantern = db.product("Lantern", 30, 5).await;

    let (status, account) = send(&app, Method::GET, "/api/me", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["id"], user.to_string());
    assert_eq!(account["balance"], 100);

    db.add_to_cart(user, lantern, 2).await;
    let (status, _) = send(&app, Method::POST, "/api/orders", user, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, account) = send(&app, Method::GET, "/api/me", user, None).await;
    assert_eq!(account["balance"], 40);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_unknown_account_is_not_found() {
    let db = TestDb::new().await;
    let app = db.app();

    let (status, body) = send(&app, Method::GET, "/api/me", UserId::generate(), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_product_detail() {
    let db = TestDb::new().await;
    let app = db.app();
    let user = db.user(0).await;
    let lantern = db.product("Lantern", 30, 5).await;

    let (status, product) =
        send(&app, Method::GET, &format!("/api/products/{lantern}"), user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Lantern");
    assert_eq!(product["price"], 30);
    assert_eq!(product["stock"], 5);

    let missing = format!("/api/products/{}", ProductId::generate());
    let (status, body) = send(&app, Method::GET, &missing, user, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
