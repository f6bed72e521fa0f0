use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A publicly traded company. Immutable after creation except via admin
/// reset. `float_shares` is the portion of `total_shares` available for
/// public trading.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub ticker: String,
    pub name: String,
    pub total_shares: i64,
    pub float_shares: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyCreate {
    pub ticker: String,
    pub name: String,
    pub total_shares: i64,
    pub float_shares: i64,
    /// When present, the float is issued to the treasury account and rested
    /// as a single SELL LIMIT order at this price.
    pub ipo_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyListResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetailResponse {
    pub ticker: String,
    pub name: String,
    pub total_shares: i64,
    pub float_shares: i64,
    pub last_price: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub volume_24h: i64,
}
