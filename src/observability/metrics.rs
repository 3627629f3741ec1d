//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trx_lifecycle_state` (gauge): current lifecycle state index
//! - `trx_samples_read_total` (counter): samples read from the device
//! - `trx_bursts_consumed_total` (counter): bursts consumed by the worker
//! - `trx_queue_overruns_total` (counter): bursts dropped on a full queue
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter only when an address is configured

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::lifecycle::state::LifecycleState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_lifecycle_state(state: LifecycleState) {
    ::metrics::gauge!("trx_lifecycle_state").set(state as u8 as f64);
}

pub fn record_samples_read(count: usize) {
    ::metrics::counter!("trx_samples_read_total").increment(count as u64);
}

pub fn record_burst_consumed() {
    ::metrics::counter!("trx_bursts_consumed_total").increment(1);
}

pub fn record_queue_overrun() {
    ::metrics::counter!("trx_queue_overruns_total").increment(1);
}
