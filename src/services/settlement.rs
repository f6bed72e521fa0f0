//! Settlement ledger: applies exactly one fill on the caller's transaction.
//!
//! A fill moves cash buyer -> seller, shares seller -> buyer, updates both
//! cost bases, advances both order lifecycles and appends the trade row.
//! Nothing here commits; the matching pass owns the transaction.

use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use super::ExchangeError;
use crate::models::{Order, OrderSide, OrderStatus, Trade};
use crate::money;

/// Apply one fill between the incoming order and a resting counterparty.
///
/// Preconditions (enforced upstream): `quantity` is at most the remaining
/// quantity of both orders, the buyer's cash covers `price_cents * quantity`
/// and the seller holds at least `quantity` shares.
pub async fn apply_fill(
    tx: &mut Transaction<'_, Sqlite>,
    incoming: &mut Order,
    resting: &mut Order,
    price_cents: i64,
    quantity: i64,
) -> Result<Trade, ExchangeError> {
    let (buyer_id, seller_id, buy_order_id, sell_order_id) = match incoming.side {
        OrderSide::Buy => (
            incoming.account_id.clone(),
            resting.account_id.clone(),
            incoming.id.clone(),
            resting.id.clone(),
        ),
        OrderSide::Sell => (
            resting.account_id.clone(),
            incoming.account_id.clone(),
            resting.id.clone(),
            incoming.id.clone(),
        ),
    };

    let total_cents = price_cents * quantity;

    transfer_cash(tx, &buyer_id, &seller_id, total_cents).await?;
    transfer_shares(tx, &incoming.ticker, &seller_id, &buyer_id, quantity, total_cents).await?;

    advance_order(tx, incoming, quantity).await?;
    advance_order(tx, resting, quantity).await?;

    let trade = Trade {
        id: Uuid::new_v4().to_string(),
        ticker: incoming.ticker.clone(),
        price_cents,
        quantity,
        buyer_id,
        seller_id,
        buy_order_id,
        sell_order_id,
        timestamp: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO trades (id, ticker, price_cents, quantity, buyer_id, seller_id, buy_order_id, sell_order_id, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&trade.id)
    .bind(&trade.ticker)
    .bind(trade.price_cents)
    .bind(trade.quantity)
    .bind(&trade.buyer_id)
    .bind(&trade.seller_id)
    .bind(&trade.buy_order_id)
    .bind(&trade.sell_order_id)
    .bind(trade.timestamp)
    .execute(&mut **tx)
    .await?;

    Ok(trade)
}

async fn transfer_cash(
    tx: &mut Transaction<'_, Sqlite>,
    buyer_id: &str,
    seller_id: &str,
    amount_cents: i64,
) -> Result<(), ExchangeError> {
    sqlx::query("UPDATE accounts SET cash_balance_cents = cash_balance_cents - ? WHERE id = ?")
        .bind(amount_cents)
        .bind(buyer_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("UPDATE accounts SET cash_balance_cents = cash_balance_cents + ? WHERE id = ?")
        .bind(amount_cents)
        .bind(seller_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Move shares seller -> buyer and keep both cost bases current.
///
/// Buyer basis grows by the full trade value. Seller basis drops by the
/// truncated per-share average times the sold quantity; a fully sold
/// holding is deleted, discarding any truncation residue with it.
async fn transfer_shares(
    tx: &mut Transaction<'_, Sqlite>,
    ticker: &str,
    seller_id: &str,
    buyer_id: &str,
    quantity: i64,
    total_cents: i64,
) -> Result<(), ExchangeError> {
    let (seller_quantity, seller_basis): (i64, i64) = sqlx::query_as(
        "SELECT quantity, cost_basis_cents FROM holdings WHERE account_id = ? AND ticker = ?",
    )
    .bind(seller_id)
    .bind(ticker)
    .fetch_one(&mut **tx)
    .await?;

    let sold_basis = money::prorated_cost(seller_basis, seller_quantity, quantity);

    if seller_quantity == quantity {
        sqlx::query("DELETE FROM holdings WHERE account_id = ? AND ticker = ?")
            .bind(seller_id)
            .bind(ticker)
            .execute(&mut **tx)
            .await?;
    } else {
        sqlx::query(
            r#"
            UPDATE holdings
            SET quantity = quantity - ?, cost_basis_cents = cost_basis_cents - ?
            WHERE account_id = ? AND ticker = ?
            "#,
        )
        .bind(quantity)
        .bind(sold_basis)
        .bind(seller_id)
        .bind(ticker)
        .execute(&mut **tx)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO holdings (account_id, ticker, quantity, cost_basis_cents)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (account_id, ticker) DO UPDATE SET
            quantity = quantity + excluded.quantity,
            cost_basis_cents = cost_basis_cents + excluded.cost_basis_cents
        "#,
    )
    .bind(buyer_id)
    .bind(ticker)
    .bind(quantity)
    .bind(total_cents)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Decrement `remaining_quantity` and move the order through its lifecycle.
async fn advance_order(
    tx: &mut Transaction<'_, Sqlite>,
    order: &mut Order,
    filled_quantity: i64,
) -> Result<(), ExchangeError> {
    order.remaining_quantity -= filled_quantity;
    order.status = if order.remaining_quantity == 0 {
        OrderStatus::Filled
    } else {
        OrderStatus::Partial
    };

    sqlx::query("UPDATE orders SET remaining_quantity = ?, status = ? WHERE id = ?")
        .bind(order.remaining_quantity)
        .bind(order.status)
        .bind(&order.id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}
