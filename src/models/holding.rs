use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::money;

/// Share ownership record, keyed by (account, ticker). Rows with quantity 0
/// do not exist; a full sell deletes the row and its cost basis with it.
#[derive(Debug, Clone, FromRow)]
pub struct Holding {
    pub account_id: String,
    pub ticker: String,
    pub quantity: i64,
    pub cost_basis_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoldingResponse {
    pub ticker: String,
    pub quantity: i64,
    pub cost_basis: Decimal,
    pub average_cost: Option<Decimal>,
}

impl From<Holding> for HoldingResponse {
    fn from(holding: Holding) -> Self {
        let average_cost = if holding.quantity > 0 {
            Some(money::decimal_from_cents(holding.cost_basis_cents) / Decimal::from(holding.quantity))
        } else {
            None
        };
        Self {
            ticker: holding.ticker,
            quantity: holding.quantity,
            cost_basis: money::decimal_from_cents(holding.cost_basis_cents),
            average_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HoldingsListResponse {
    pub holdings: Vec<HoldingResponse>,
}
