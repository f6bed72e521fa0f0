use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One aggregated price level of the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBookResponse {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub spread: Option<Decimal>,
    pub last_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketDataResponse {
    pub ticker: String,
    pub last_price: Option<Decimal>,
    pub open_24h: Option<Decimal>,
    pub high_24h: Option<Decimal>,
    pub low_24h: Option<Decimal>,
    pub change_24h: Option<Decimal>,
    pub change_percent_24h: Option<Decimal>,
    pub volume_24h: i64,
    pub market_cap: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketDataSummary {
    pub ticker: String,
    pub last_price: Option<Decimal>,
    pub change_24h: Option<Decimal>,
    pub volume_24h: i64,
    pub market_cap: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllMarketDataResponse {
    pub markets: Vec<MarketDataSummary>,
    pub timestamp: DateTime<Utc>,
}
