#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use stock_exchange::config::AppConfig;
use stock_exchange::db::Database;
use stock_exchange::models::{
    AccountCreate, CompanyCreate, Order, OrderCreate, OrderSide, OrderStatus, OrderType, Trade,
};
use stock_exchange::services::{admin, trading, ExchangeError};
use stock_exchange::AppState;

pub async fn test_db() -> Database {
    Database::in_memory().await.expect("in-memory database")
}

pub async fn test_state() -> Arc<AppState> {
    Arc::new(AppState {
        config: AppConfig::default(),
        db: test_db().await,
        metrics: None,
    })
}

pub async fn seed_company(db: &Database, ticker: &str) {
    admin::create_company(
        db,
        CompanyCreate {
            ticker: ticker.to_string(),
            name: format!("{ticker} Inc."),
            total_shares: 1_000_000,
            float_shares: 500_000,
            ipo_price: None,
        },
    )
    .await
    .expect("seed company");
}

/// Create an account and return its API key.
pub async fn seed_account(db: &Database, id: &str, cash: Decimal) -> String {
    let created = admin::create_account(
        db,
        AccountCreate {
            account_id: id.to_string(),
            initial_cash: Some(cash),
        },
    )
    .await
    .expect("seed account");
    created.api_key
}

pub async fn seed_holding(
    db: &Database,
    account_id: &str,
    ticker: &str,
    quantity: i64,
    cost_basis_cents: i64,
) {
    sqlx::query(
        "INSERT INTO holdings (account_id, ticker, quantity, cost_basis_cents) VALUES (?, ?, ?, ?)",
    )
    .bind(account_id)
    .bind(ticker)
    .bind(quantity)
    .bind(cost_basis_cents)
    .execute(db.pool())
    .await
    .expect("seed holding");
}

pub async fn place(
    db: &Database,
    account_id: &str,
    ticker: &str,
    side: OrderSide,
    order_type: OrderType,
    quantity: i64,
    price: Option<Decimal>,
) -> Result<(Order, Vec<Trade>), ExchangeError> {
    trading::place_order(
        db,
        account_id,
        OrderCreate {
            ticker: ticker.to_string(),
            side,
            order_type,
            quantity,
            price,
        },
    )
    .await
}

pub async fn cash_cents(db: &Database, account_id: &str) -> i64 {
    sqlx::query_scalar("SELECT cash_balance_cents FROM accounts WHERE id = ?")
        .bind(account_id)
        .fetch_one(db.pool())
        .await
        .expect("account cash")
}

/// (quantity, cost_basis_cents) of a holding, or None when the row is gone.
pub async fn holding(db: &Database, account_id: &str, ticker: &str) -> Option<(i64, i64)> {
    sqlx::query_as("SELECT quantity, cost_basis_cents FROM holdings WHERE account_id = ? AND ticker = ?")
        .bind(account_id)
        .bind(ticker)
        .fetch_optional(db.pool())
        .await
        .expect("holding lookup")
}

pub async fn order_by_id(db: &Database, order_id: &str) -> Order {
    sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(db.pool())
        .await
        .expect("order lookup")
}

pub async fn order_count(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(db.pool())
        .await
        .expect("order count")
}

pub async fn trades_for(db: &Database, ticker: &str) -> Vec<Trade> {
    sqlx::query_as("SELECT * FROM trades WHERE ticker = ? ORDER BY timestamp, id")
        .bind(ticker)
        .fetch_all(db.pool())
        .await
        .expect("trades lookup")
}

pub async fn total_cash_cents(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COALESCE(SUM(cash_balance_cents), 0) FROM accounts")
        .fetch_one(db.pool())
        .await
        .expect("total cash")
}

pub async fn total_shares_held(db: &Database, ticker: &str) -> i64 {
    sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM holdings WHERE ticker = ?")
        .bind(ticker)
        .fetch_one(db.pool())
        .await
        .expect("total shares")
}

/// Insert a trade row directly, for windowed market-data tests. Creates the
/// two referenced (already terminal) orders on the fly.
pub async fn insert_trade_at(
    db: &Database,
    ticker: &str,
    price_cents: i64,
    quantity: i64,
    buyer_id: &str,
    seller_id: &str,
    timestamp: DateTime<Utc>,
) {
    let buy_order_id = insert_filled_order(db, buyer_id, ticker, OrderSide::Buy, quantity).await;
    let sell_order_id = insert_filled_order(db, seller_id, ticker, OrderSide::Sell, quantity).await;

    sqlx::query(
        r#"
        INSERT INTO trades (id, ticker, price_cents, quantity, buyer_id, seller_id, buy_order_id, sell_order_id, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(ticker)
    .bind(price_cents)
    .bind(quantity)
    .bind(buyer_id)
    .bind(seller_id)
    .bind(buy_order_id)
    .bind(sell_order_id)
    .bind(timestamp)
    .execute(db.pool())
    .await
    .expect("insert trade");
}

async fn insert_filled_order(
    db: &Database,
    account_id: &str,
    ticker: &str,
    side: OrderSide,
    quantity: i64,
) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO orders (id, account_id, ticker, side, order_type, price_cents, quantity, remaining_quantity, status, timestamp)
        VALUES (?, ?, ?, ?, 'LIMIT', 100, ?, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(account_id)
    .bind(ticker)
    .bind(side)
    .bind(quantity)
    .bind(OrderStatus::Filled)
    .bind(Utc::now())
    .execute(db.pool())
    .await
    .expect("insert order");
    id
}
