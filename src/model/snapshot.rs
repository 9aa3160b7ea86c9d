//! Immutable configuration snapshot.
//!
//! # Design Decisions
//! - Fields are private; consumers only get shared references
//! - Route order is the input order of admitted routes
//! - Cluster iteration order is unspecified (map semantics)

use serde::Serialize;
use std::collections::HashMap;

use crate::model::{Cluster, ProxyRoute};

/// The result of one configuration build, consumed by the data plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Configuration {
    clusters: HashMap<String, Cluster>,
    routes: Vec<ProxyRoute>,
}

impl Configuration {
    pub(crate) fn new(clusters: HashMap<String, Cluster>, routes: Vec<ProxyRoute>) -> Self {
        Self { clusters, routes }
    }

    /// Admitted clusters keyed by id.
    pub fn clusters(&self) -> &HashMap<String, Cluster> {
        &self.clusters
    }

    /// Look up an admitted cluster.
    pub fn cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.get(id)
    }

    /// Admitted routes, in input order.
    pub fn routes(&self) -> &[ProxyRoute] {
        &self.routes
    }

    /// Look up an admitted route.
    pub fn route(&self, route_id: &str) -> Option<&ProxyRoute> {
        self.routes.iter().find(|r| r.route_id == route_id)
    }

    /// True when neither clusters nor routes were admitted.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.routes.is_empty()
    }

    /// Consume the snapshot, returning its parts.
    pub fn into_parts(self) -> (HashMap<String, Cluster>, Vec<ProxyRoute>) {
        (self.clusters, self.routes)
    }
}
