//! Metrics collection and exposition.
//!
//! # Metrics
//! - `swan_client_rpc_requests_total` (counter): chain-node calls by method, outcome
//! - `swan_client_rest_requests_total` (counter): task-service calls by operation, outcome
//! - `swan_client_deals_total` (counter): deal sequences by outcome
//! - `swan_client_request_duration_seconds` (histogram): transport latency by target
//!
//! Recording is a no-op until a recorder is installed, so library users that
//! do not call [`init_metrics`] pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const RPC_REQUESTS: &str = "swan_client_rpc_requests_total";
pub const REST_REQUESTS: &str = "swan_client_rest_requests_total";
pub const DEALS: &str = "swan_client_deals_total";
pub const REQUEST_DURATION: &str = "swan_client_request_duration_seconds";

/// Install the Prometheus exporter and describe all metrics.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            register_metrics();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

fn register_metrics() {
    describe_counter!(RPC_REQUESTS, "Chain node JSON-RPC calls by method and outcome");
    describe_counter!(REST_REQUESTS, "Task service REST calls by operation and outcome");
    describe_counter!(DEALS, "Deal proposal sequences by outcome");
    describe_histogram!(REQUEST_DURATION, "Transport round-trip latency in seconds");
}

/// Record one chain-node call. `outcome` is `ok` or an `ErrorKind` name.
pub fn record_rpc(method: &'static str, outcome: &'static str) {
    counter!(RPC_REQUESTS, "method" => method, "outcome" => outcome).increment(1);
}

/// Record one task-service call.
pub fn record_rest(operation: &'static str, outcome: &'static str) {
    counter!(REST_REQUESTS, "operation" => operation, "outcome" => outcome).increment(1);
}

pub fn record_deal(outcome: &'static str) {
    counter!(DEALS, "outcome" => outcome).increment(1);
}

pub fn record_duration(target: &'static str, start: Instant) {
    histogram!(REQUEST_DURATION, "target" => target).record(start.elapsed().as_secs_f64());
}
