//! # Request Metrics
//!
//! Per-request counters and latency histograms via the `metrics`
//! facade. The binary installs a Prometheus recorder and serves the
//! rendered registry at `/metrics`.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};

/// Middleware recording request count, error count, and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    counter!(
        "packhouse_http_requests_total",
        "method" => method.clone(),
        "status" => status.as_u16().to_string(),
    )
    .increment(1);
    if status.is_client_error() || status.is_server_error() {
        counter!("packhouse_http_errors_total", "method" => method.clone()).increment(1);
    }
    histogram!("packhouse_http_request_seconds", "method" => method)
        .record(started.elapsed().as_secs_f64());

    tracing::trace!(%path, status = status.as_u16(), "request served");
    response
}
