//! API-key authentication middleware.
//!
//! The `X-API-Key` header is hashed and looked up against the stored
//! digests; the matching account is attached to the request extensions for
//! handlers to consume.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::models::Account;
use crate::services::admin::hash_api_key;
use crate::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// The authenticated account, inserted by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub Account);

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let Some(api_key) = api_key else {
        return Err(ApiError::unauthorized("Missing API key"));
    };

    let key_hash = hash_api_key(api_key);
    let account: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE api_key_hash = ?")
        .bind(&key_hash)
        .fetch_optional(state.db.pool())
        .await
        .map_err(|err| {
            tracing::error!("account lookup failed: {err}");
            ApiError::internal()
        })?;

    let Some(account) = account else {
        return Err(ApiError::unauthorized("Invalid API key"));
    };

    request.extensions_mut().insert(AuthAccount(account));
    Ok(next.run(request).await)
}
