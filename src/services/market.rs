//! Public market-data projections.
//!
//! Everything here is derived live from order and trade rows; projections
//! never mutate and never cache.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::ExchangeError;
use crate::models::{
    AllMarketDataResponse, Company, MarketDataResponse, MarketDataSummary, OrderBookLevel,
    OrderBookResponse, Trade,
};
use crate::money;

pub async fn get_companies(pool: &SqlitePool) -> Result<Vec<Company>, ExchangeError> {
    let companies = sqlx::query_as("SELECT * FROM companies ORDER BY ticker")
        .fetch_all(pool)
        .await?;
    Ok(companies)
}

pub async fn get_company(pool: &SqlitePool, ticker: &str) -> Result<Option<Company>, ExchangeError> {
    let company = sqlx::query_as("SELECT * FROM companies WHERE ticker = ?")
        .bind(ticker.to_uppercase())
        .fetch_optional(pool)
        .await?;
    Ok(company)
}

/// Most recent trade price for a ticker, if it ever traded.
pub async fn last_price_cents(
    pool: &SqlitePool,
    ticker: &str,
) -> Result<Option<i64>, ExchangeError> {
    let price = sqlx::query_scalar(
        "SELECT price_cents FROM trades WHERE ticker = ? ORDER BY timestamp DESC, id DESC LIMIT 1",
    )
    .bind(ticker)
    .fetch_optional(pool)
    .await?;
    Ok(price)
}

pub async fn volume_24h(pool: &SqlitePool, ticker: &str) -> Result<i64, ExchangeError> {
    let cutoff = Utc::now() - Duration::hours(24);
    let volume = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity), 0) FROM trades WHERE ticker = ? AND timestamp >= ?",
    )
    .bind(ticker)
    .bind(cutoff)
    .fetch_one(pool)
    .await?;
    Ok(volume)
}

/// (opening, high, low) over the trailing 24 hours, all in cents.
pub async fn price_stats_24h(
    pool: &SqlitePool,
    ticker: &str,
) -> Result<(Option<i64>, Option<i64>, Option<i64>), ExchangeError> {
    let cutoff = Utc::now() - Duration::hours(24);

    let (high, low): (Option<i64>, Option<i64>) = sqlx::query_as(
        "SELECT MAX(price_cents), MIN(price_cents) FROM trades WHERE ticker = ? AND timestamp >= ?",
    )
    .bind(ticker)
    .bind(cutoff)
    .fetch_one(pool)
    .await?;

    let opening: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT price_cents FROM trades WHERE ticker = ? AND timestamp >= ?
        ORDER BY timestamp ASC, id ASC LIMIT 1
        "#,
    )
    .bind(ticker)
    .bind(cutoff)
    .fetch_optional(pool)
    .await?;

    Ok((opening, high, low))
}

/// Aggregated book: (bids, asks). Bids descend, asks ascend, both truncated
/// to `depth` levels. Only resting LIMIT orders contribute.
pub async fn order_book(
    pool: &SqlitePool,
    ticker: &str,
    depth: i64,
) -> Result<(Vec<OrderBookLevel>, Vec<OrderBookLevel>), ExchangeError> {
    let bids: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT price_cents, SUM(remaining_quantity) FROM orders
        WHERE ticker = ? AND side = 'BUY' AND status IN ('OPEN', 'PARTIAL')
          AND price_cents IS NOT NULL
        GROUP BY price_cents ORDER BY price_cents DESC LIMIT ?
        "#,
    )
    .bind(ticker)
    .bind(depth)
    .fetch_all(pool)
    .await?;

    let asks: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT price_cents, SUM(remaining_quantity) FROM orders
        WHERE ticker = ? AND side = 'SELL' AND status IN ('OPEN', 'PARTIAL')
          AND price_cents IS NOT NULL
        GROUP BY price_cents ORDER BY price_cents ASC LIMIT ?
        "#,
    )
    .bind(ticker)
    .bind(depth)
    .fetch_all(pool)
    .await?;

    let to_level = |(price_cents, quantity): (i64, i64)| OrderBookLevel {
        price: money::decimal_from_cents(price_cents),
        quantity,
    };
    Ok((
        bids.into_iter().map(to_level).collect(),
        asks.into_iter().map(to_level).collect(),
    ))
}

pub async fn order_book_response(
    pool: &SqlitePool,
    ticker: &str,
    depth: i64,
) -> Result<OrderBookResponse, ExchangeError> {
    let (bids, asks) = order_book(pool, ticker, depth).await?;
    let last_price = last_price_cents(pool, ticker).await?.map(money::decimal_from_cents);

    let spread = match (bids.first(), asks.first()) {
        (Some(best_bid), Some(best_ask)) => Some(best_ask.price - best_bid.price),
        _ => None,
    };

    Ok(OrderBookResponse {
        ticker: ticker.to_string(),
        timestamp: Utc::now(),
        bids,
        asks,
        spread,
        last_price,
    })
}

/// Recent trades, most recent first.
pub async fn recent_trades(
    pool: &SqlitePool,
    ticker: &str,
    limit: i64,
) -> Result<Vec<Trade>, ExchangeError> {
    let trades = sqlx::query_as(
        "SELECT * FROM trades WHERE ticker = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(ticker)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(trades)
}

pub async fn market_data(
    pool: &SqlitePool,
    company: &Company,
) -> Result<MarketDataResponse, ExchangeError> {
    let last_price = last_price_cents(pool, &company.ticker).await?.map(money::decimal_from_cents);
    let volume_24h = volume_24h(pool, &company.ticker).await?;
    let (opening, high, low) = price_stats_24h(pool, &company.ticker).await?;

    let open_24h = opening.map(money::decimal_from_cents);
    let change_24h = match (last_price, open_24h) {
        (Some(last), Some(open)) => Some(last - open),
        _ => None,
    };
    let change_percent_24h = match (change_24h, open_24h) {
        (Some(change), Some(open)) if open > Decimal::ZERO => {
            Some(change / open * Decimal::ONE_HUNDRED)
        }
        _ => None,
    };

    Ok(MarketDataResponse {
        ticker: company.ticker.clone(),
        last_price,
        open_24h,
        high_24h: high.map(money::decimal_from_cents),
        low_24h: low.map(money::decimal_from_cents),
        change_24h,
        change_percent_24h,
        volume_24h,
        market_cap: market_cap(last_price, company),
        timestamp: Utc::now(),
    })
}

pub async fn all_market_data(pool: &SqlitePool) -> Result<AllMarketDataResponse, ExchangeError> {
    let companies = get_companies(pool).await?;

    let mut markets = Vec::with_capacity(companies.len());
    for company in &companies {
        let last_price =
            last_price_cents(pool, &company.ticker).await?.map(money::decimal_from_cents);
        let volume_24h = volume_24h(pool, &company.ticker).await?;
        let (opening, _, _) = price_stats_24h(pool, &company.ticker).await?;

        let change_24h = match (last_price, opening.map(money::decimal_from_cents)) {
            (Some(last), Some(open)) => Some(last - open),
            _ => None,
        };

        markets.push(MarketDataSummary {
            ticker: company.ticker.clone(),
            last_price,
            change_24h,
            volume_24h,
            market_cap: market_cap(last_price, company),
        });
    }

    Ok(AllMarketDataResponse {
        markets,
        timestamp: Utc::now(),
    })
}

fn market_cap(last_price: Option<Decimal>, company: &Company) -> Option<Decimal> {
    last_price.map(|price| price * Decimal::from(company.float_shares))
}
