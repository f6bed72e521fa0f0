use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stock_exchange::config::AppConfig;
use stock_exchange::db::Database;
use stock_exchange::{build_router, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_exchange=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting stock-exchange v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(&config.database_url, config.sql_echo).await?;
    tracing::info!("Database connected at {}", config.database_url);

    let metrics_handle = config.metrics_enabled.then(metrics::init_metrics);
    if metrics_handle.is_some() {
        tracing::info!("Prometheus metrics exposed at {}", config.metrics_path);
    } else {
        tracing::info!("Metrics disabled");
    }

    let port = config.port;
    let state = Arc::new(AppState {
        config,
        db,
        metrics: metrics_handle,
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
