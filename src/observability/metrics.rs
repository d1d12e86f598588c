//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by route, status
//! - `relay_request_duration_seconds` (histogram): inbound latency by route
//! - `relay_upstream_attempts_total` (counter): outbound calls by upstream host, outcome
//!
//! Recording is a no-op until [`init_metrics`] installs an exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome of one upstream call during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    Rejected,
    Unreachable,
}

impl AttemptOutcome {
    fn as_str(self) -> &'static str {
        match self {
            AttemptOutcome::Accepted => "accepted",
            AttemptOutcome::Rejected => "rejected",
            AttemptOutcome::Unreachable => "unreachable",
        }
    }
}

/// Install the Prometheus exporter with an HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!("relay_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_attempt(upstream: &str, outcome: AttemptOutcome) {
    metrics::counter!(
        "relay_upstream_attempts_total",
        "upstream" => upstream.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
