//! In-memory repositories.
//!
//! # Responsibilities
//! - Hold the current raw definitions for embedding or tests
//! - Hand every fetch its own copy
//! - Replace the stored set atomically
//!
//! # Design Decisions
//! - `ArcSwapOption` so readers never block writers
//! - `None` models a store that was never populated

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::model::{Cluster, ProxyRoute};
use crate::repository::{ClustersRepo, RepoError, RoutesRepo};

/// Clusters held in memory.
#[derive(Debug, Default)]
pub struct InMemoryClustersRepo {
    clusters: ArcSwapOption<HashMap<String, Cluster>>,
}

impl InMemoryClustersRepo {
    /// Create a repository with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with clusters.
    pub fn with_clusters(clusters: HashMap<String, Cluster>) -> Self {
        Self {
            clusters: ArcSwapOption::from_pointee(clusters),
        }
    }

    /// Replace the stored clusters.
    pub fn set_clusters(&self, clusters: HashMap<String, Cluster>) {
        tracing::debug!(count = clusters.len(), "Storing clusters");
        self.clusters.store(Some(Arc::new(clusters)));
    }

    /// Drop the stored clusters.
    pub fn clear(&self) {
        self.clusters.store(None);
    }
}

#[async_trait]
impl ClustersRepo for InMemoryClustersRepo {
    async fn get_clusters(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Option<HashMap<String, Cluster>>, RepoError> {
        Ok(self.clusters.load_full().map(|c| (*c).clone()))
    }
}

/// Routes held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRoutesRepo {
    routes: ArcSwapOption<Vec<ProxyRoute>>,
}

impl InMemoryRoutesRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routes(routes: Vec<ProxyRoute>) -> Self {
        Self {
            routes: ArcSwapOption::from_pointee(routes),
        }
    }

    /// Replace the stored routes.
    pub fn set_routes(&self, routes: Vec<ProxyRoute>) {
        tracing::debug!(count = routes.len(), "Storing routes");
        self.routes.store(Some(Arc::new(routes)));
    }

    pub fn clear(&self) {
        self.routes.store(None);
    }
}

#[async_trait]
impl RoutesRepo for InMemoryRoutesRepo {
    async fn get_routes(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Option<Vec<ProxyRoute>>, RepoError> {
        Ok(self.routes.load_full().map(|r| (*r).clone()))
    }
}
