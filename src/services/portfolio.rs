//! Portfolio projection: holdings valued at last trade price, unrealized
//! P/L against cost basis. Read-only.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::{market, ExchangeError};
use crate::models::{Account, Holding, HoldingWithPnl, PortfolioSummaryResponse};
use crate::money;

pub async fn holdings_with_pnl(
    pool: &SqlitePool,
    account_id: &str,
) -> Result<Vec<HoldingWithPnl>, ExchangeError> {
    let holdings: Vec<Holding> =
        sqlx::query_as("SELECT * FROM holdings WHERE account_id = ? ORDER BY ticker")
            .bind(account_id)
            .fetch_all(pool)
            .await?;

    let mut result = Vec::with_capacity(holdings.len());
    for holding in holdings {
        let current_price =
            market::last_price_cents(pool, &holding.ticker).await?.map(money::decimal_from_cents);
        let cost_basis = money::decimal_from_cents(holding.cost_basis_cents);

        let (current_value, unrealized_pnl, unrealized_pnl_percent) = match current_price {
            Some(price) => {
                let value = price * Decimal::from(holding.quantity);
                let pnl = value - cost_basis;
                let percent = if cost_basis > Decimal::ZERO {
                    Some(pnl / cost_basis * Decimal::ONE_HUNDRED)
                } else {
                    None
                };
                (Some(value), Some(pnl), percent)
            }
            None => (None, None, None),
        };

        let average_cost = if holding.quantity > 0 {
            Some(cost_basis / Decimal::from(holding.quantity))
        } else {
            None
        };

        result.push(HoldingWithPnl {
            ticker: holding.ticker,
            quantity: holding.quantity,
            cost_basis,
            average_cost,
            current_price,
            current_value,
            unrealized_pnl,
            unrealized_pnl_percent,
        });
    }

    Ok(result)
}

/// Whole-portfolio rollup. Holdings are only valued when every held ticker
/// has a last price; otherwise the valuation fields stay null.
pub async fn portfolio_summary(
    pool: &SqlitePool,
    account: &Account,
) -> Result<PortfolioSummaryResponse, ExchangeError> {
    let holdings = holdings_with_pnl(pool, &account.id).await?;
    let cash_balance = money::decimal_from_cents(account.cash_balance_cents);

    let total_cost_basis: Decimal = holdings.iter().map(|h| h.cost_basis).sum();

    let (holdings_value, total_value, unrealized_pnl, unrealized_pnl_percent) = if holdings
        .is_empty()
    {
        (
            Some(Decimal::ZERO),
            Some(cash_balance),
            Some(Decimal::ZERO),
            Some(Decimal::ZERO),
        )
    } else if holdings.iter().all(|h| h.current_value.is_some()) {
        let value: Decimal = holdings.iter().filter_map(|h| h.current_value).sum();
        let pnl = value - total_cost_basis;
        let percent = if total_cost_basis > Decimal::ZERO {
            Some(pnl / total_cost_basis * Decimal::ONE_HUNDRED)
        } else {
            None
        };
        (Some(value), Some(cash_balance + value), Some(pnl), percent)
    } else {
        (None, None, None, None)
    };

    Ok(PortfolioSummaryResponse {
        account_id: account.id.clone(),
        cash_balance,
        holdings_value,
        total_value,
        total_cost_basis,
        unrealized_pnl,
        unrealized_pnl_percent,
        total_invested: total_cost_basis,
    })
}
