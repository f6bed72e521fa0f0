//! Order validation and lifecycle.
//!
//! `place_order` runs the whole acceptance pipeline inside one write-locked
//! transaction: validate, insert as OPEN, run the matching pass, commit.
//! A rejected submission leaves no state behind.

use chrono::Utc;
use uuid::Uuid;

use super::{matching, ExchangeError};
use crate::db::Database;
use crate::metrics;
use crate::models::{Account, Holding, Order, OrderCreate, OrderSide, OrderStatus, OrderType, Trade};
use crate::money;

/// Validate and place an order, matching it immediately. Returns the order
/// as of the end of the matching pass together with its fills.
pub async fn place_order(
    db: &Database,
    account_id: &str,
    data: OrderCreate,
) -> Result<(Order, Vec<Trade>), ExchangeError> {
    let _guard = db.lock_writes().await;
    let mut tx = db.pool().begin().await?;

    let ticker = data.ticker.to_uppercase();
    let known: Option<String> = sqlx::query_scalar("SELECT ticker FROM companies WHERE ticker = ?")
        .bind(&ticker)
        .fetch_optional(&mut *tx)
        .await?;
    if known.is_none() {
        return Err(ExchangeError::UnknownTicker(ticker));
    }

    if data.quantity <= 0 {
        return Err(ExchangeError::InvalidQuantity);
    }

    // Market orders never store a price; anything supplied is discarded.
    let price_cents = match data.order_type {
        OrderType::Limit => {
            let price = data.price.ok_or(ExchangeError::InvalidPrice)?;
            let cents = money::cents_from_decimal(price)
                .filter(|cents| *cents > 0)
                .ok_or(ExchangeError::InvalidPrice)?;
            Some(cents)
        }
        OrderType::Market => None,
    };

    let account: Account = sqlx::query_as("SELECT * FROM accounts WHERE id = ?")
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ExchangeError::UnknownAccount(account_id.to_string()))?;

    match data.side {
        OrderSide::Sell => {
            let held: i64 = sqlx::query_scalar(
                "SELECT COALESCE((SELECT quantity FROM holdings WHERE account_id = ? AND ticker = ?), 0)",
            )
            .bind(&account.id)
            .bind(&ticker)
            .fetch_one(&mut *tx)
            .await?;

            // Shares already committed to this account's open sell orders.
            let committed: i64 = sqlx::query_scalar(
                r#"
                SELECT COALESCE(SUM(remaining_quantity), 0) FROM orders
                WHERE account_id = ? AND ticker = ? AND side = 'SELL'
                  AND status IN ('OPEN', 'PARTIAL')
                "#,
            )
            .bind(&account.id)
            .bind(&ticker)
            .fetch_one(&mut *tx)
            .await?;

            let available = held - committed;
            if data.quantity > available {
                return Err(ExchangeError::InsufficientShares {
                    available,
                    required: data.quantity,
                });
            }
        }
        OrderSide::Buy => {
            // Market buys reserve no cash; they are re-validated per fill.
            if let Some(price_cents) = price_cents {
                let required_cents = price_cents * data.quantity;

                let committed_cents: i64 = sqlx::query_scalar(
                    r#"
                    SELECT COALESCE(SUM(price_cents * remaining_quantity), 0) FROM orders
                    WHERE account_id = ? AND side = 'BUY' AND status IN ('OPEN', 'PARTIAL')
                      AND price_cents IS NOT NULL
                    "#,
                )
                .bind(&account.id)
                .fetch_one(&mut *tx)
                .await?;

                let available_cents = account.cash_balance_cents - committed_cents;
                if required_cents > available_cents {
                    return Err(ExchangeError::InsufficientFunds {
                        available: money::decimal_from_cents(available_cents),
                        required: money::decimal_from_cents(required_cents),
                    });
                }
            }
        }
    }

    let mut order = Order {
        id: Uuid::new_v4().to_string(),
        account_id: account.id.clone(),
        ticker,
        side: data.side,
        order_type: data.order_type,
        price_cents,
        quantity: data.quantity,
        remaining_quantity: data.quantity,
        status: OrderStatus::Open,
        timestamp: Utc::now(),
    };
    insert_order(&mut tx, &order).await?;

    metrics::record_order_placed(&order.ticker, order.side, order.order_type);
    tracing::info!(
        order_id = %order.id,
        account_id = %order.account_id,
        ticker = %order.ticker,
        side = %order.side,
        order_type = %order.order_type,
        quantity = order.quantity,
        "order accepted"
    );

    let trades = matching::match_order(&mut tx, &mut order).await?;
    tx.commit().await?;

    Ok((order, trades))
}

pub(crate) async fn insert_order(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order: &Order,
) -> Result<(), ExchangeError> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, account_id, ticker, side, order_type, price_cents, quantity, remaining_quantity, status, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&order.id)
    .bind(&order.account_id)
    .bind(&order.ticker)
    .bind(order.side)
    .bind(order.order_type)
    .bind(order.price_cents)
    .bind(order.quantity)
    .bind(order.remaining_quantity)
    .bind(order.status)
    .bind(order.timestamp)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Cancel an OPEN or PARTIAL order; `remaining_quantity` is frozen as-is.
pub async fn cancel_order(
    db: &Database,
    account_id: &str,
    order_id: &str,
) -> Result<Order, ExchangeError> {
    let _guard = db.lock_writes().await;
    let mut tx = db.pool().begin().await?;

    let mut order: Order = sqlx::query_as("SELECT * FROM orders WHERE id = ? AND account_id = ?")
        .bind(order_id)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ExchangeError::UnknownOrder(order_id.to_string()))?;

    if order.status.is_terminal() {
        return Err(ExchangeError::NotCancellable(order.status));
    }

    order.status = OrderStatus::Cancelled;
    sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(order.status)
        .bind(&order.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    metrics::record_order_cancelled(&order.ticker);
    tracing::info!(order_id = %order.id, ticker = %order.ticker, "order cancelled");

    Ok(order)
}

/// Orders of one account, newest first, optionally filtered.
pub async fn get_account_orders(
    db: &Database,
    account_id: &str,
    status: Option<OrderStatus>,
    ticker: Option<&str>,
) -> Result<Vec<Order>, ExchangeError> {
    let mut sql = String::from("SELECT * FROM orders WHERE account_id = ?");
    if status.is_some() {
        sql.push_str(" AND status = ?");
    }
    if ticker.is_some() {
        sql.push_str(" AND ticker = ?");
    }
    sql.push_str(" ORDER BY timestamp DESC");

    let mut query = sqlx::query_as::<_, Order>(&sql).bind(account_id);
    if let Some(status) = status {
        query = query.bind(status);
    }
    if let Some(ticker) = ticker {
        query = query.bind(ticker.to_uppercase());
    }

    Ok(query.fetch_all(db.pool()).await?)
}

/// One order, scoped to its owner. Foreign orders read as not found.
pub async fn get_order(
    db: &Database,
    account_id: &str,
    order_id: &str,
) -> Result<Option<Order>, ExchangeError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = ? AND account_id = ?")
        .bind(order_id)
        .bind(account_id)
        .fetch_optional(db.pool())
        .await?;
    Ok(order)
}

pub async fn get_account_holdings(
    db: &Database,
    account_id: &str,
) -> Result<Vec<Holding>, ExchangeError> {
    let holdings =
        sqlx::query_as("SELECT * FROM holdings WHERE account_id = ? ORDER BY ticker")
            .bind(account_id)
            .fetch_all(db.pool())
            .await?;
    Ok(holdings)
}
