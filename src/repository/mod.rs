//! Backing stores for raw cluster and route definitions.
//!
//! # Data Flow
//! ```text
//! ConfigBuilder::build_config
//!     → ClustersRepo::get_clusters ┐ (concurrent)
//!     → RoutesRepo::get_routes     ┘
//!     → owned copies handed to the build
//! ```
//!
//! # Design Decisions
//! - Repositories return owned collections; builds never share mutable state
//! - `None` and empty collections both mean "no data", never an error
//! - Failures here are fatal to a build (no partial snapshot without a base set)

pub mod file;
pub mod memory;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::model::{Cluster, ProxyRoute};

pub use file::{FileRepo, ProxyDocument};
pub use memory::{InMemoryClustersRepo, InMemoryRoutesRepo};

/// Error returned when a repository cannot supply data.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Source of raw cluster definitions, keyed by cluster id.
#[async_trait]
pub trait ClustersRepo: Send + Sync {
    async fn get_clusters(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<HashMap<String, Cluster>>, RepoError>;
}

/// Source of raw route definitions, in evaluation order.
#[async_trait]
pub trait RoutesRepo: Send + Sync {
    async fn get_routes(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<ProxyRoute>>, RepoError>;
}
