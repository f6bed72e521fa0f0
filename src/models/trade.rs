use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::money;

/// A completed trade. Append-only; the single source of truth for price
/// history and volume.
#[derive(Debug, Clone, FromRow)]
pub struct Trade {
    pub id: String,
    pub ticker: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub buyer_id: String,
    pub seller_id: String,
    pub buy_order_id: String,
    pub sell_order_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Public trade view: buyer and seller stay anonymous.
#[derive(Debug, Clone, Serialize)]
pub struct TradePublic {
    pub id: String,
    pub price: Decimal,
    pub quantity: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<Trade> for TradePublic {
    fn from(trade: Trade) -> Self {
        Self {
            id: trade.id,
            price: money::decimal_from_cents(trade.price_cents),
            quantity: trade.quantity,
            timestamp: trade.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TradesResponse {
    pub ticker: String,
    pub trades: Vec<TradePublic>,
}
