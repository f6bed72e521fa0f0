//! HTTP surface tests driven through the router.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_authed(uri: &str, api_key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-API-Key", api_key)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_authed(uri: &str, api_key: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-API-Key", api_key)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete_authed(uri: &str, api_key: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("X-API-Key", api_key)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_and_version() {
    let state = test_state().await;
    let app = stock_exchange::build_router(state);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = send(&app, get("/api/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_version"], "v1");
}

#[tokio::test]
async fn company_creation_uppercases_and_rejects_duplicates() {
    let state = test_state().await;
    let app = stock_exchange::build_router(state);

    let payload = json!({
        "ticker": "tech",
        "name": "Tech Corp",
        "total_shares": 1_000_000i64,
        "float_shares": 500_000i64,
    });
    let (status, body) = send(&app, post_json("/admin/companies", payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticker"], "TECH");

    let (status, body) = send(&app, post_json("/admin/companies", payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_TICKER");

    let (status, body) = send(&app, get("/admin/companies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn account_creation_returns_key_once() {
    let state = test_state().await;
    let app = stock_exchange::build_router(state);

    let payload = json!({ "account_id": "alice", "initial_cash": 1000.00 });
    let (status, body) = send(&app, post_json("/admin/accounts", payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account_id"], "alice");
    assert_eq!(body["cash_balance"], "1000.00");
    let api_key = body["api_key"].as_str().unwrap().to_string();
    assert!(api_key.starts_with("sk_"));

    let (status, body) = send(&app, post_json("/admin/accounts", payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_ACCOUNT");

    // The listing never echoes keys.
    let (status, body) = send(&app, get("/admin/accounts")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body[0].get("api_key").is_none());

    // The key authenticates its account.
    let (status, body) = send(&app, get_authed("/api/v1/account", &api_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_id"], "alice");
}

#[tokio::test]
async fn missing_or_bad_credentials_are_rejected() {
    let state = test_state().await;
    let app = stock_exchange::build_router(state);

    let response = app
        .clone()
        .oneshot(get("/api/v1/account"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "ApiKey"
    );

    let (status, body) = send(&app, get_authed("/api/v1/account", "sk_bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn order_flow_over_http() {
    let state = test_state().await;
    seed_company(&state.db, "TECH").await;
    let seller_key = seed_account(&state.db, "seller", dec!(0)).await;
    let buyer_key = seed_account(&state.db, "buyer", dec!(10000)).await;
    seed_holding(&state.db, "seller", "TECH", 1000, 0).await;
    let app = stock_exchange::build_router(state.clone());

    let (status, body) = send(
        &app,
        post_json_authed(
            "/api/v1/orders",
            &seller_key,
            json!({ "ticker": "TECH", "side": "SELL", "order_type": "LIMIT", "quantity": 100, "price": 45.00 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "OPEN");
    assert_eq!(body["price"], "45.00");

    let (status, body) = send(
        &app,
        post_json_authed(
            "/api/v1/orders",
            &buyer_key,
            json!({ "ticker": "TECH", "side": "BUY", "order_type": "LIMIT", "quantity": 100, "price": 50.00 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "FILLED");
    assert_eq!(body["remaining_quantity"], 0);
    let buy_order_id = body["order_id"].as_str().unwrap().to_string();

    // Owner-scoped reads
    let (status, body) = send(
        &app,
        get_authed(&format!("/api/v1/orders/{buy_order_id}"), &buyer_key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "FILLED");

    let (status, _) = send(
        &app,
        get_authed(&format!("/api/v1/orders/{buy_order_id}"), &seller_key),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        get_authed("/api/v1/orders?status=FILLED&ticker=TECH", &buyer_key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);

    // Public projections reflect the trade.
    let (status, body) = send(&app, get("/api/v1/trades/TECH")).await;
    assert_eq!(status, StatusCode::OK);
    let trades = body["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["price"], "45.00");
    assert!(trades[0].get("buyer_id").is_none());

    let (status, body) = send(&app, get("/api/v1/market-data/TECH")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_price"], "45.00");
    assert_eq!(body["volume_24h"], 100);

    let (status, body) = send(&app, get_authed("/api/v1/holdings", &buyer_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holdings"][0]["ticker"], "TECH");
    assert_eq!(body["holdings"][0]["quantity"], 100);

    let (status, body) = send(&app, get_authed("/api/v1/portfolio/summary", &buyer_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cash_balance"], "5500.00");
    assert_eq!(body["total_value"], "10000.00");
}

#[tokio::test]
async fn cancel_is_rejected_on_terminal_orders() {
    let state = test_state().await;
    seed_company(&state.db, "TECH").await;
    let buyer_key = seed_account(&state.db, "buyer", dec!(1000)).await;
    let app = stock_exchange::build_router(state);

    let (status, body) = send(
        &app,
        post_json_authed(
            "/api/v1/orders",
            &buyer_key,
            json!({ "ticker": "TECH", "side": "BUY", "order_type": "LIMIT", "quantity": 10, "price": 10.00 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["order_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        delete_authed(&format!("/api/v1/orders/{order_id}"), &buyer_key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["remaining_quantity"], 10);

    let (status, body) = send(
        &app,
        delete_authed(&format!("/api/v1/orders/{order_id}"), &buyer_key),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ORDER_NOT_CANCELLABLE");
}

#[tokio::test]
async fn submission_errors_map_to_status_codes() {
    let state = test_state().await;
    seed_company(&state.db, "TECH").await;
    let key = seed_account(&state.db, "trader", dec!(50)).await;
    let app = stock_exchange::build_router(state);

    // Unknown ticker -> 404
    let (status, body) = send(
        &app,
        post_json_authed(
            "/api/v1/orders",
            &key,
            json!({ "ticker": "NOPE", "side": "BUY", "order_type": "LIMIT", "quantity": 1, "price": 1.00 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TICKER_NOT_FOUND");

    // Insufficient funds -> 400 with amounts disclosed
    let (status, body) = send(
        &app,
        post_json_authed(
            "/api/v1/orders",
            &key,
            json!({ "ticker": "TECH", "side": "BUY", "order_type": "LIMIT", "quantity": 10, "price": 10.00 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_FUNDS");
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("50.00"));
    assert!(message.contains("100.00"));

    // Missing price on LIMIT -> 400
    let (status, body) = send(
        &app,
        post_json_authed(
            "/api/v1/orders",
            &key,
            json!({ "ticker": "TECH", "side": "BUY", "order_type": "LIMIT", "quantity": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PRICE");
}

#[tokio::test]
async fn query_bounds_are_enforced() {
    let state = test_state().await;
    seed_company(&state.db, "TECH").await;
    let app = stock_exchange::build_router(state);

    let (status, body) = send(&app, get("/api/v1/orderbook/TECH?depth=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_DEPTH");

    let (status, _) = send(&app, get("/api/v1/orderbook/TECH?depth=51")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/v1/orderbook/TECH")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["bids"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, get("/api/v1/trades/TECH?limit=501")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_LIMIT");

    let (status, _) = send(&app, get("/api/v1/orderbook/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_clears_all_state() {
    let state = test_state().await;
    seed_company(&state.db, "TECH").await;
    seed_account(&state.db, "trader", dec!(100)).await;
    let app = stock_exchange::build_router(state);

    let (status, _) = send(&app, post_json("/admin/reset", json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/admin/companies")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(&app, get("/admin/accounts")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
