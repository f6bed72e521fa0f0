use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::auth::auth_middleware;
use crate::AppState;

/// Admin surface, mounted at /admin. Auth is a deployment concern.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/companies",
            post(handlers::admin::create_company).get(handlers::admin::list_companies),
        )
        .route(
            "/accounts",
            post(handlers::admin::create_account).get(handlers::admin::list_accounts),
        )
        .route("/reset", post(handlers::admin::reset))
}

/// Versioned API surface, mounted at /api/v1.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/companies", get(handlers::public::list_companies))
        .route("/companies/:ticker", get(handlers::public::get_company))
        .route("/orderbook/:ticker", get(handlers::public::get_order_book))
        .route("/trades/:ticker", get(handlers::public::get_trades))
        .route("/market-data", get(handlers::public::get_all_market_data))
        .route("/market-data/:ticker", get(handlers::public::get_market_data));

    // Protected routes (X-API-Key required)
    let protected_routes = Router::new()
        .route("/account", get(handlers::trader::get_account))
        .route("/holdings", get(handlers::trader::get_holdings))
        .route(
            "/orders",
            post(handlers::trader::create_order).get(handlers::trader::list_orders),
        )
        .route("/orders/:order_id", get(handlers::trader::get_order))
        .route("/orders/:order_id", delete(handlers::trader::cancel_order))
        .route("/portfolio/summary", get(handlers::portfolio::get_summary))
        .route("/portfolio/holdings", get(handlers::portfolio::get_holdings))
        .layer(axum_middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
