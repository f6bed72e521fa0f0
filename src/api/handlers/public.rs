//! Public market-data handlers. No authentication; trades stay anonymous.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::models::{
    AllMarketDataResponse, Company, CompanyDetailResponse, CompanyListResponse,
    MarketDataResponse, OrderBookResponse, TradePublic, TradesResponse,
};
use crate::money;
use crate::services::market;
use crate::AppState;

const DEFAULT_DEPTH: i64 = 10;
const MAX_DEPTH: i64 = 50;
const DEFAULT_TRADES_LIMIT: i64 = 50;
const MAX_TRADES_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct OrderBookQuery {
    pub depth: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<i64>,
}

async fn require_company(state: &AppState, ticker: &str) -> Result<Company, ApiError> {
    market::get_company(state.db.pool(), ticker)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                "TICKER_NOT_FOUND",
                format!("Company with ticker '{}' not found", ticker.to_uppercase()),
            )
        })
}

/// GET /api/v1/companies
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CompanyListResponse>, ApiError> {
    let companies = market::get_companies(state.db.pool()).await?;
    Ok(Json(CompanyListResponse { companies }))
}

/// GET /api/v1/companies/:ticker
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<CompanyDetailResponse>, ApiError> {
    let company = require_company(&state, &ticker).await?;

    let last_price = market::last_price_cents(state.db.pool(), &company.ticker)
        .await?
        .map(money::decimal_from_cents);
    let volume_24h = market::volume_24h(state.db.pool(), &company.ticker).await?;
    let market_cap = last_price.map(|price| price * rust_decimal::Decimal::from(company.float_shares));

    Ok(Json(CompanyDetailResponse {
        ticker: company.ticker,
        name: company.name,
        total_shares: company.total_shares,
        float_shares: company.float_shares,
        last_price,
        market_cap,
        volume_24h,
    }))
}

/// GET /api/v1/orderbook/:ticker?depth=N
pub async fn get_order_book(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<OrderBookQuery>,
) -> Result<Json<OrderBookResponse>, ApiError> {
    let depth = query.depth.unwrap_or(DEFAULT_DEPTH);
    if !(1..=MAX_DEPTH).contains(&depth) {
        return Err(ApiError::bad_request(
            "INVALID_DEPTH",
            format!("depth must be between 1 and {MAX_DEPTH}"),
        ));
    }

    let company = require_company(&state, &ticker).await?;
    let book = market::order_book_response(state.db.pool(), &company.ticker, depth).await?;
    Ok(Json(book))
}

/// GET /api/v1/trades/:ticker?limit=N
pub async fn get_trades(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<TradesQuery>,
) -> Result<Json<TradesResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TRADES_LIMIT);
    if !(1..=MAX_TRADES_LIMIT).contains(&limit) {
        return Err(ApiError::bad_request(
            "INVALID_LIMIT",
            format!("limit must be between 1 and {MAX_TRADES_LIMIT}"),
        ));
    }

    let company = require_company(&state, &ticker).await?;
    let trades = market::recent_trades(state.db.pool(), &company.ticker, limit).await?;

    Ok(Json(TradesResponse {
        ticker: company.ticker,
        trades: trades.into_iter().map(TradePublic::from).collect(),
    }))
}

/// GET /api/v1/market-data/:ticker
pub async fn get_market_data(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<MarketDataResponse>, ApiError> {
    let company = require_company(&state, &ticker).await?;
    let data = market::market_data(state.db.pool(), &company).await?;
    Ok(Json(data))
}

/// GET /api/v1/market-data
pub async fn get_all_market_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AllMarketDataResponse>, ApiError> {
    let data = market::all_market_data(state.db.pool()).await?;
    Ok(Json(data))
}
