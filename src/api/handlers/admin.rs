//! Admin handlers. Deployment is expected to gate these routes; the core
//! applies no authentication here.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::models::{
    AccountCreate, AccountListItem, AccountResponse, Company, CompanyCreate,
};
use crate::services::admin as admin_service;
use crate::AppState;

/// POST /admin/companies
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    Json(data): Json<CompanyCreate>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let company = admin_service::create_company(&state.db, data).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /admin/companies
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Company>>, ApiError> {
    let companies = admin_service::list_companies(&state.db).await?;
    Ok(Json(companies))
}

/// POST /admin/accounts
///
/// The response carries the API key exactly once; only its digest is kept.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(data): Json<AccountCreate>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = admin_service::create_account(&state.db, data).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /admin/accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccountListItem>>, ApiError> {
    let accounts = admin_service::list_accounts(&state.db).await?;
    Ok(Json(accounts.into_iter().map(AccountListItem::from).collect()))
}

/// POST /admin/reset
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    admin_service::reset(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}
