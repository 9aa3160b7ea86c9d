//! Validation of filtered entities.
//!
//! # Data Flow
//! ```text
//! Cluster  (after filter chain) → cluster.rs → Ok | ValidationErrors
//! ProxyRoute (after filter chain) → route.rs → Ok | ValidationErrors
//! ```
//!
//! # Design Decisions
//! - Validators are stateless apart from compiled patterns
//! - All problems of one entity are collected, not just the first
//! - Validation is a single terminal stage; it never re-runs filters

pub mod cluster;
pub mod route;

use std::fmt;

pub use cluster::ClusterValidator;
pub use route::RouteValidator;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("route id must not be empty")]
    MissingRouteId,

    #[error("route '{0}' was already defined")]
    DuplicateRouteId(String),

    #[error("route requires hosts or a path; use path '/{{**catchall}}' to match all requests")]
    MissingMatch,

    #[error("invalid host '{0}'")]
    InvalidHost(String),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    #[error("duplicate HTTP method '{0}'")]
    DuplicateMethod(String),

    #[error("cluster id must not be empty")]
    MissingClusterId,

    #[error("cluster id '{id}' does not match its key '{key}'")]
    ClusterKeyMismatch { key: String, id: String },

    #[error("destination key must not be empty")]
    MissingDestinationKey,

    #[error("health check interval must be at least one millisecond")]
    ZeroHealthCheckInterval,
}

/// Every violation found for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub(crate) fn into_result(errors: Vec<ValidationError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
