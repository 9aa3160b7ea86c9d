//! Configuration build pipeline.
//!
//! # Data Flow
//! ```text
//! ClustersRepo ─┐
//!               ├─ concurrent fetch (cancellable)
//! RoutesRepo ───┘
//!     → per cluster: filter chain → ClusterValidator → Admitted | Rejected
//!     → per route:   filter chain → RouteValidator   → Admitted | Rejected
//!     → Configuration { clusters, routes }
//!
//! Rejected entities:
//!     → ErrorRecord → ErrorReporter
//! ```
//!
//! # Design Decisions
//! - Entity failures are absorbed; only fetch failures and cancellation fail a build
//! - Every filter in the chain runs even after one fails; one record per failure
//! - Each entity is finished before the next one starts
//! - Each build owns the collections it fetched; nothing is shared between builds

pub mod config_builder;

use crate::filters::Cancelled;
use crate::repository::RepoError;

pub use config_builder::ConfigBuilder;

/// Build-level failure.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("configuration build cancelled")]
    Cancelled,

    #[error("failed to fetch clusters: {0}")]
    ClustersFetch(#[source] RepoError),

    #[error("failed to fetch routes: {0}")]
    RoutesFetch(#[source] RepoError),
}

impl BuildError {
    /// Metrics label for a build outcome.
    pub(crate) fn outcome(result: &Result<crate::model::Configuration, BuildError>) -> &'static str {
        match result {
            Ok(_) => "success",
            Err(BuildError::Cancelled) => "cancelled",
            Err(_) => "fetch_error",
        }
    }
}

impl From<Cancelled> for BuildError {
    fn from(_: Cancelled) -> Self {
        BuildError::Cancelled
    }
}

/// Tunables for a `ConfigBuilder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Send validation rejections to the error reporter. When false they are
    /// only logged at debug level.
    pub report_validation_failures: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            report_validation_failures: true,
        }
    }
}
