//! # Prometheus Metrics
//!
//! Request metrics recorded through the `metrics` facade and exported by
//! `metrics-exporter-prometheus`.
//!
//! HTTP-level metrics (request counts, latency) are recorded in middleware.
//! Registry gauges (producers, farms, harvests, crops) are updated on each
//! `/metrics` scrape (pull model); see the metrics handler in `lib.rs`.
//!
//! Without an installed recorder every macro is a no-op, so tests and
//! deployments with `METRICS_ENABLED=false` pay nothing.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use agro_registry::RecordCounts;

/// Install the process-wide Prometheus recorder and return its render handle.
///
/// Fails if a recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    ::metrics::describe_counter!("http_requests_total", "Total HTTP requests");
    ::metrics::describe_histogram!(
        "http_request_duration_seconds",
        ::metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    ::metrics::describe_gauge!("registry_records", "Records currently held by the registry");
    Ok(handle)
}

/// Record one completed request.
pub fn record_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    ::metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

/// Publish the registry's record counts as gauges.
pub fn record_registry_gauges(counts: RecordCounts) {
    for (kind, count) in [
        ("producers", counts.producers),
        ("farms", counts.farms),
        ("harvests", counts.harvests),
        ("crops", counts.crops),
    ] {
        ::metrics::gauge!("registry_records", "kind" => kind).set(count as f64);
    }
}

/// Replace UUID path segments with `{id}` to keep label cardinality bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.len() == 36
                && segment.chars().enumerate().all(|(i, c)| {
                    if i == 8 || i == 13 || i == 18 || i == 23 {
                        c == '-'
                    } else {
                        c.is_ascii_hexdigit()
                    }
                })
            {
                "{id}"
            } else if segment.len() == 32 && segment.chars().all(|c| c.is_ascii_hexdigit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records HTTP request metrics.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    record_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
