pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod metrics;
pub mod models;
pub mod money;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::db::Database;

pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub metrics: Option<PrometheusHandle>,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    version: &'static str,
    api_version: &'static str,
    min_client_version: &'static str,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/api/version", get(get_version))
        .nest("/admin", api::routes::admin_router())
        .nest("/api/v1", api::routes::api_router(state.clone()));

    if state.config.metrics_enabled {
        router = router.route(&state.config.metrics_path, get(render_metrics));
    }

    router
        .layer(axum::middleware::from_fn(
            api::middleware::metrics::metrics_middleware,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        api_version: "v1",
        min_client_version: "0.2.0",
    })
}

async fn render_metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    match &state.metrics {
        Some(handle) => Ok(handle.render()),
        None => Err(ApiError::not_found("METRICS_DISABLED", "metrics are disabled")),
    }
}
