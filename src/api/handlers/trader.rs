//! Authenticated trader handlers: account, holdings, order lifecycle.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::auth::AuthAccount;
use crate::models::{
    AccountInfoResponse, HoldingResponse, HoldingsListResponse, OrderCreate, OrderListResponse,
    OrderResponse, OrderStatus,
};
use crate::services::trading;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub ticker: Option<String>,
}

/// GET /api/v1/account
pub async fn get_account(
    Extension(AuthAccount(account)): Extension<AuthAccount>,
) -> Json<AccountInfoResponse> {
    Json(AccountInfoResponse::from(account))
}

/// GET /api/v1/holdings
pub async fn get_holdings(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account)): Extension<AuthAccount>,
) -> Result<Json<HoldingsListResponse>, ApiError> {
    let holdings = trading::get_account_holdings(&state.db, &account.id).await?;
    Ok(Json(HoldingsListResponse {
        holdings: holdings.into_iter().map(HoldingResponse::from).collect(),
    }))
}

/// POST /api/v1/orders
///
/// Returns the order as of the end of its matching pass: status and
/// remaining quantity already reflect any fills.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account)): Extension<AuthAccount>,
    Json(data): Json<OrderCreate>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let (order, trades) = trading::place_order(&state.db, &account.id, data).await?;
    tracing::debug!(
        order_id = %order.id,
        fills = trades.len(),
        status = %order.status,
        "order submission completed"
    );
    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// GET /api/v1/orders?status=&ticker=
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account)): Extension<AuthAccount>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(raw.to_uppercase().parse::<OrderStatus>().map_err(|_| {
            ApiError::bad_request("INVALID_STATUS", format!("Unknown order status '{raw}'"))
        })?),
    };
    let ticker = query.ticker.as_deref().filter(|ticker| !ticker.is_empty());

    let orders = trading::get_account_orders(&state.db, &account.id, status, ticker).await?;
    Ok(Json(OrderListResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

/// GET /api/v1/orders/:order_id
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account)): Extension<AuthAccount>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = trading::get_order(&state.db, &account.id, &order_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("ORDER_NOT_FOUND", format!("Order '{order_id}' not found"))
        })?;
    Ok(Json(OrderResponse::from(order)))
}

/// DELETE /api/v1/orders/:order_id
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(AuthAccount(account)): Extension<AuthAccount>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = trading::cancel_order(&state.db, &account.id, &order_id).await?;
    Ok(Json(OrderResponse::from(order)))
}
