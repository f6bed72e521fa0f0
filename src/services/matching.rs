//! Price-time priority matching.
//!
//! Rules, in order:
//! 1. BUY orders match the lowest-priced resting SELL, SELL orders the
//!    highest-priced resting BUY; at equal price the earlier submission
//!    wins, with the order id as a final deterministic tie-break.
//! 2. The execution price is always the resting order's price.
//! 3. Orders from the same account never match each other.
//! 4. A buyer short of cash stops the pass (reachable only for MARKET buys;
//!    LIMIT buys reserve cash at acceptance).
//! 5. A MARKET order's unfilled remainder is cancelled in the same pass.

use sqlx::{Sqlite, Transaction};

use super::{settlement, ExchangeError};
use crate::metrics;
use crate::models::{Order, OrderSide, OrderStatus, OrderType, Trade};
use crate::money;

/// Match an accepted order against the resting book, settling each fill on
/// the caller's transaction. Returns the trades in execution order.
pub async fn match_order(
    tx: &mut Transaction<'_, Sqlite>,
    order: &mut Order,
) -> Result<Vec<Trade>, ExchangeError> {
    let mut trades = Vec::new();

    while order.remaining_quantity > 0 {
        let Some(mut resting) = best_match(tx, order).await? else {
            break;
        };
        // The book query excludes price-less rows; market orders never rest.
        let Some(price_cents) = resting.price_cents else {
            break;
        };

        let quantity = order.remaining_quantity.min(resting.remaining_quantity);

        let buyer_id = match order.side {
            OrderSide::Buy => &order.account_id,
            OrderSide::Sell => &resting.account_id,
        };
        let buyer_cash: i64 =
            sqlx::query_scalar("SELECT cash_balance_cents FROM accounts WHERE id = ?")
                .bind(buyer_id)
                .fetch_one(&mut **tx)
                .await?;
        if buyer_cash < price_cents * quantity {
            break;
        }

        let trade = settlement::apply_fill(tx, order, &mut resting, price_cents, quantity).await?;

        metrics::record_trade(&trade.ticker, trade.quantity, trade.price_cents);
        if order.status == OrderStatus::Filled {
            metrics::record_order_filled(&order.ticker);
        }
        if resting.status == OrderStatus::Filled {
            metrics::record_order_filled(&resting.ticker);
        }

        tracing::info!(
            trade_id = %trade.id,
            ticker = %trade.ticker,
            quantity = trade.quantity,
            price = %money::decimal_from_cents(trade.price_cents),
            buyer_id = %trade.buyer_id,
            seller_id = %trade.seller_id,
            "trade executed"
        );

        trades.push(trade);
    }

    // Immediate-or-cancel: market orders never rest in the book.
    if order.order_type == OrderType::Market && order.remaining_quantity > 0 {
        order.status = OrderStatus::Cancelled;
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(order.status)
            .bind(&order.id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(trades)
}

/// Find the best qualifying resting order for `order`, or `None`.
async fn best_match(
    tx: &mut Transaction<'_, Sqlite>,
    order: &Order,
) -> Result<Option<Order>, sqlx::Error> {
    let sql = match order.side {
        OrderSide::Buy => {
            r#"
            SELECT * FROM orders
            WHERE ticker = ? AND side = 'SELL' AND status IN ('OPEN', 'PARTIAL')
              AND account_id <> ? AND price_cents IS NOT NULL
              AND (? IS NULL OR price_cents <= ?)
            ORDER BY price_cents ASC, timestamp ASC, id ASC
            LIMIT 1
            "#
        }
        OrderSide::Sell => {
            r#"
            SELECT * FROM orders
            WHERE ticker = ? AND side = 'BUY' AND status IN ('OPEN', 'PARTIAL')
              AND account_id <> ? AND price_cents IS NOT NULL
              AND (? IS NULL OR price_cents >= ?)
            ORDER BY price_cents DESC, timestamp ASC, id ASC
            LIMIT 1
            "#
        }
    };

    let limit = match order.order_type {
        OrderType::Limit => order.price_cents,
        OrderType::Market => None,
    };

    sqlx::query_as::<_, Order>(sql)
        .bind(&order.ticker)
        .bind(&order.account_id)
        .bind(limit)
        .bind(limit)
        .fetch_optional(&mut **tx)
        .await
}
