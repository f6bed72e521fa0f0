//! Authenticated portfolio handlers.

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::auth::AuthAccount;
use crate::models::{PortfolioHoldingsResponse, PortfolioSummaryResponse};
use crate::services::portfolio;
use crate::AppState;

/// GET /api/v1/portfolio/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account)): Extension<AuthAccount>,
) -> Result<Json<PortfolioSummaryResponse>, ApiError> {
    let summary = portfolio::portfolio_summary(state.db.pool(), &account).await?;
    Ok(Json(summary))
}

/// GET /api/v1/portfolio/holdings
pub async fn get_holdings(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account)): Extension<AuthAccount>,
) -> Result<Json<PortfolioHoldingsResponse>, ApiError> {
    let holdings = portfolio::holdings_with_pnl(state.db.pool(), &account.id).await?;
    Ok(Json(PortfolioHoldingsResponse { holdings }))
}
