//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define pipeline metrics (builds, admitted/rejected entities)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `config_builds_total` (counter): builds by outcome
//! - `config_build_duration_seconds` (histogram): build latency
//! - `config_entities_admitted_total` (counter): by kind
//! - `config_entities_rejected_total` (counter): by kind, stage
//! - `config_snapshot_clusters` / `config_snapshot_routes` (gauge): last snapshot size
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Without an installed recorder every call is a no-op

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError as ExporterError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::model::Configuration;
use crate::observability::errors::{EntityKind, Stage};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), ExporterError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record a finished build.
pub fn record_build(outcome: &'static str, start_time: Instant) {
    counter!("config_builds_total", "outcome" => outcome).increment(1);
    histogram!("config_build_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

pub fn record_admitted(kind: EntityKind) {
    counter!("config_entities_admitted_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_rejected(kind: EntityKind, stage: &Stage) {
    counter!(
        "config_entities_rejected_total",
        "kind" => kind.as_str(),
        "stage" => stage.label()
    )
    .increment(1);
}

/// Record the size of the latest snapshot.
pub fn record_snapshot(config: &Configuration) {
    gauge!("config_snapshot_clusters").set(config.clusters().len() as f64);
    gauge!("config_snapshot_routes").set(config.routes().len() as f64);
}
