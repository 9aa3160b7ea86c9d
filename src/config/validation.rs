//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<SettingsIssue>>

use std::net::SocketAddr;

use crate::config::schema::Settings;

/// A semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsIssue {
    #[error("source.path must not be empty")]
    EmptySourcePath,

    #[error("health_check.interval_secs must be greater than zero")]
    ZeroHealthCheckInterval,

    #[error("health_check.timeout_secs ({timeout}) must not exceed interval_secs ({interval})")]
    HealthCheckTimeoutTooLong { timeout: u64, interval: u64 },

    #[error("unknown observability.log_level '{0}'")]
    UnknownLogLevel(String),

    #[error("invalid observability.metrics_address '{0}'")]
    InvalidMetricsAddress(String),
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check settings for semantic problems.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<SettingsIssue>> {
    let mut issues = Vec::new();

    if settings.source.path.trim().is_empty() {
        issues.push(SettingsIssue::EmptySourcePath);
    }

    let health = &settings.health_check;
    if health.apply_defaults {
        if health.interval_secs == 0 {
            issues.push(SettingsIssue::ZeroHealthCheckInterval);
        } else if health.timeout_secs > health.interval_secs {
            issues.push(SettingsIssue::HealthCheckTimeoutTooLong {
                timeout: health.timeout_secs,
                interval: health.interval_secs,
            });
        }
    }

    let obs = &settings.observability;
    if !LOG_LEVELS.contains(&obs.log_level.to_ascii_lowercase().as_str()) {
        issues.push(SettingsIssue::UnknownLogLevel(obs.log_level.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        issues.push(SettingsIssue::InvalidMetricsAddress(obs.metrics_address.clone()));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
