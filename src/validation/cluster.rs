//! Cluster validation.
//!
//! # Responsibilities
//! - Require a cluster id matching its key in the source mapping
//! - Check destination keys
//! - Check declarative health check options
//!
//! Destination addresses are opaque strings here; their syntax belongs to
//! whoever dials them.

use crate::model::Cluster;
use crate::validation::{ValidationError, ValidationErrors};

/// Validates clusters after they went through the filter chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterValidator;

impl ClusterValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a cluster found under `key`.
    pub fn validate(&self, key: &str, cluster: &Cluster) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if cluster.id.trim().is_empty() {
            errors.push(ValidationError::MissingClusterId);
        } else if cluster.id != key {
            errors.push(ValidationError::ClusterKeyMismatch {
                key: key.to_string(),
                id: cluster.id.clone(),
            });
        }

        for dest_key in cluster.destinations.keys() {
            if dest_key.trim().is_empty() {
                errors.push(ValidationError::MissingDestinationKey);
            }
        }

        if let Some(health) = &cluster.health_check_options {
            // Sub-millisecond intervals do not survive a snapshot round trip.
            if health.enabled && health.interval.as_millis() == 0 {
                errors.push(ValidationError::ZeroHealthCheckInterval);
            }
        }

        ValidationErrors::into_result(errors)
    }
}
