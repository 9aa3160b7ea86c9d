//! Config filter subsystem.
//!
//! # Data Flow
//! ```text
//! raw Cluster / ProxyRoute
//!     → filter 1 → filter 2 → ... → filter N   (registration order)
//!     → FilterFailure per failing invocation
//!     → builder decides Admitted / Rejected
//! ```
//!
//! # Design Decisions
//! - Filters are trait objects registered in an explicit order
//! - A failing filter does not stop the chain; the entity is rejected afterwards
//! - Panics inside a filter are contained to the entity being configured
//! - Cancellation aborts the chain immediately

pub mod chain;
pub mod health;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::model::{Cluster, ProxyRoute};

pub use chain::{Cancelled, FilterChain, FilterFailure, FilterPanicked};
pub use health::DefaultHealthCheckFilter;

/// Error type filters return. Kept as-is in the resulting error record.
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// A hook allowed to rewrite clusters and routes before they are validated.
///
/// Both hooks default to doing nothing so a filter only implements what it needs.
#[async_trait]
pub trait ConfigFilter: Send + Sync {
    /// Name used in logs and error records.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Configure a cluster in place.
    async fn configure_cluster(
        &self,
        _cluster: &mut Cluster,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        Ok(())
    }

    /// Configure a route in place.
    async fn configure_route(
        &self,
        _route: &mut ProxyRoute,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        Ok(())
    }
}
