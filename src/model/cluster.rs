//! Cluster definitions.
//!
//! A cluster is a named group of destinations that routes forward to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A named group of backend destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Cluster {
    /// Cluster identifier, unique within a snapshot.
    pub id: String,

    /// Destinations keyed by a caller-assigned name unique within the cluster.
    pub destinations: HashMap<String, Destination>,

    /// Declarative health check settings (execution lives elsewhere).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_options: Option<HealthCheckOptions>,

    /// Load balancing policy to apply across destinations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancing: Option<LoadBalancingMode>,

    /// Arbitrary key/value pairs for use by filters and the data plane.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Cluster {
    /// Create an empty cluster with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Add a destination, replacing any previous one under the same key.
    pub fn with_destination(mut self, key: impl Into<String>, destination: Destination) -> Self {
        self.destinations.insert(key.into(), destination);
        self
    }
}

/// One backend endpoint within a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Destination {
    /// Endpoint address, e.g. "https://10.0.0.1:8443/".
    pub address: String,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Destination {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            metadata: HashMap::new(),
        }
    }
}

/// Active health check options for a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthCheckOptions {
    /// Whether active health checks run for this cluster.
    #[serde(default)]
    pub enabled: bool,

    /// Probe interval.
    #[serde(rename = "interval_ms", with = "crate::model::millis")]
    pub interval: Duration,

    /// Probe timeout.
    #[serde(
        rename = "timeout_ms",
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::model::millis::option"
    )]
    pub timeout: Option<Duration>,

    /// Path to probe, e.g. "/health".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl HealthCheckOptions {
    /// Enabled health checks at the given interval.
    pub fn enabled(interval: Duration) -> Self {
        Self {
            enabled: true,
            interval,
            timeout: None,
            path: None,
        }
    }
}

/// Load balancing policies the data plane understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingMode {
    First,
    Random,
    RoundRobin,
    LeastRequests,
    PowerOfTwoChoices,
}
