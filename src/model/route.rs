//! Route definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A rule matching incoming requests to a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyRoute {
    /// Route identifier, unique within a snapshot.
    pub route_id: String,

    /// Request match conditions.
    #[serde(rename = "match")]
    pub match_: ProxyMatch,

    /// Disambiguates overlapping routes.
    pub priority: i32,

    /// Cluster to forward matched requests to.
    /// Not checked against the known clusters at build time.
    pub cluster_id: String,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl ProxyRoute {
    /// Create a route with the given id pointing at a cluster.
    pub fn new(route_id: impl Into<String>, cluster_id: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            cluster_id: cluster_id.into(),
            ..Default::default()
        }
    }

    /// Replace the host patterns this route matches.
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.match_.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.match_.path = Some(path.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Match conditions of a route. All present conditions must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyMatch {
    /// Host names or wildcard patterns ("*.example.com"), in order.
    pub hosts: Vec<String>,

    /// Path pattern, e.g. "/api/{**catchall}".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// HTTP methods; absent means any method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}
