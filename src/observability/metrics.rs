//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by site kind and outcome
//! - `site_request_duration_seconds` (histogram): latency of site endpoints
//! - `site_resolve_duration_seconds` (histogram): hostname resolution time
//! - `site_config_cache_total` (counter): cache lookups by result
//! - `site_config_cache_entries` (gauge): cached effective configs
//! - `site_admin_actions_total` (counter): admin mutations by action
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Labels are small closed sets (kind, outcome, result, action)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(kind: &str, outcome: &'static str, start: Instant) {
    let kind = kind.to_string();
    metrics::counter!("site_requests_total", "kind" => kind.clone(), "outcome" => outcome).increment(1);
    metrics::histogram!("site_request_duration_seconds", "kind" => kind, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_resolve_duration(start: Instant) {
    metrics::histogram!("site_resolve_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(result: &'static str) {
    metrics::counter!("site_config_cache_total", "result" => result).increment(1);
}

pub fn record_cache_size(size: usize) {
    metrics::gauge!("site_config_cache_entries").set(size as f64);
}

pub fn record_admin_action(action: &'static str) {
    metrics::counter!("site_admin_actions_total", "action" => action).increment(1);
}
