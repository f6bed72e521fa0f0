use rust_decimal::Decimal;
use serde::Serialize;

/// A holding priced at the last trade, with unrealized P/L against its cost
/// basis. Valuation fields are null when the ticker has never traded.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingWithPnl {
    pub ticker: String,
    pub quantity: i64,
    pub cost_basis: Decimal,
    pub average_cost: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub unrealized_pnl_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioHoldingsResponse {
    pub holdings: Vec<HoldingWithPnl>,
}

/// Whole-portfolio rollup. If any held ticker lacks a price, the aggregate
/// valuation fields are null rather than partial.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummaryResponse {
    pub account_id: String,
    pub cash_balance: Decimal,
    pub holdings_value: Option<Decimal>,
    pub total_value: Option<Decimal>,
    pub total_cost_basis: Decimal,
    pub unrealized_pnl: Option<Decimal>,
    pub unrealized_pnl_percent: Option<Decimal>,
    pub total_invested: Decimal,
}
