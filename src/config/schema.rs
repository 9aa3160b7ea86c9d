//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from the settings file.

use serde::{Deserialize, Serialize};

use crate::builder::BuildOptions;

/// Root settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Where raw cluster and route definitions are read from.
    pub source: SourceConfig,

    /// Validation stage behaviour.
    pub validation: ValidationConfig,

    /// Defaults for clusters without health check options.
    pub health_check: HealthCheckConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Options handed to the config builder.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            report_validation_failures: self.validation.report_failures,
        }
    }
}

/// Definition source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Path to the TOML definition file.
    pub path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: "proxy.toml".to_string(),
        }
    }
}

/// Validation stage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Send validation rejections to the error reporter.
    pub report_failures: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            report_failures: true,
        }
    }
}

/// Default health check options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Register the built-in filter that applies these defaults.
    pub apply_defaults: bool,

    /// Enable active health checks on clusters that get the defaults.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Health check timeout in seconds.
    pub timeout_secs: u64,

    /// Path to probe.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            apply_defaults: false,
            enabled: true,
            interval_secs: 10,
            timeout_secs: 5,
            path: "/health".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
