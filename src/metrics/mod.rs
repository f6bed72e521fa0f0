//! Prometheus metrics for the exchange.
//!
//! Counter names follow the exchange telemetry convention
//! (`exchange_*_total`); HTTP metrics are recorded by the middleware in
//! `api::middleware`.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::models::{OrderSide, OrderType};

/// Metric names as constants for consistency
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "http_requests_in_flight";

    pub const ORDERS_TOTAL: &str = "exchange_orders_total";
    pub const ORDERS_FILLED_TOTAL: &str = "exchange_orders_filled_total";
    pub const ORDERS_CANCELLED_TOTAL: &str = "exchange_orders_cancelled_total";
    pub const TRADES_TOTAL: &str = "exchange_trades_total";
    pub const TRADE_VOLUME_TOTAL: &str = "exchange_trade_volume_total";
    pub const TRADE_VALUE_CENTS_TOTAL: &str = "exchange_trade_value_cents_total";
}

/// Label keys
pub mod labels {
    pub const METHOD: &str = "method";
    pub const ENDPOINT: &str = "endpoint";
    pub const STATUS: &str = "status";
    pub const TICKER: &str = "ticker";
    pub const SIDE: &str = "side";
    pub const ORDER_TYPE: &str = "order_type";
}

/// Install the Prometheus recorder and return the render handle.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(names::HTTP_REQUEST_DURATION_SECONDS.to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )
        .expect("histogram buckets must be non-empty")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        labels::METHOD => method.to_string(),
        labels::ENDPOINT => endpoint.to_string(),
        labels::STATUS => status.clone()
    )
    .increment(1);

    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        labels::METHOD => method.to_string(),
        labels::ENDPOINT => endpoint.to_string(),
        labels::STATUS => status
    )
    .record(duration_secs);
}

pub fn http_request_started() {
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
}

pub fn http_request_finished() {
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);
}

pub fn record_order_placed(ticker: &str, side: OrderSide, order_type: OrderType) {
    counter!(
        names::ORDERS_TOTAL,
        labels::TICKER => ticker.to_string(),
        labels::SIDE => side.to_string(),
        labels::ORDER_TYPE => order_type.to_string()
    )
    .increment(1);
}

pub fn record_order_filled(ticker: &str) {
    counter!(names::ORDERS_FILLED_TOTAL, labels::TICKER => ticker.to_string()).increment(1);
}

pub fn record_order_cancelled(ticker: &str) {
    counter!(names::ORDERS_CANCELLED_TOTAL, labels::TICKER => ticker.to_string()).increment(1);
}

pub fn record_trade(ticker: &str, quantity: i64, price_cents: i64) {
    counter!(names::TRADES_TOTAL, labels::TICKER => ticker.to_string()).increment(1);
    counter!(names::TRADE_VOLUME_TOTAL, labels::TICKER => ticker.to_string())
        .increment(quantity as u64);
    counter!(names::TRADE_VALUE_CENTS_TOTAL, labels::TICKER => ticker.to_string())
        .increment((price_cents * quantity) as u64);
}
