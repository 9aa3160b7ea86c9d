//! Shared helpers for configuration pipeline tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use reverse_proxy_config::builder::ConfigBuilder;
use reverse_proxy_config::filters::{ConfigFilter, FilterChain, FilterError};
use reverse_proxy_config::model::{Cluster, Destination, HealthCheckOptions, ProxyRoute};
use reverse_proxy_config::observability::CollectingErrorReporter;
use reverse_proxy_config::repository::{
    ClustersRepo, InMemoryClustersRepo, InMemoryRoutesRepo, RepoError, RoutesRepo,
};

pub const TEST_ADDRESS: &str = "https://localhost:123/";

/// Build a builder over in-memory repositories, returning the error sink too.
pub fn create_builder(
    clusters: Option<HashMap<String, Cluster>>,
    routes: Option<Vec<ProxyRoute>>,
    filters: FilterChain,
) -> (ConfigBuilder, Arc<CollectingErrorReporter>) {
    let clusters_repo = match clusters {
        Some(c) => InMemoryClustersRepo::with_clusters(c),
        None => InMemoryClustersRepo::new(),
    };
    let routes_repo = match routes {
        Some(r) => InMemoryRoutesRepo::with_routes(r),
        None => InMemoryRoutesRepo::new(),
    };
    let reporter = Arc::new(CollectingErrorReporter::new());
    let builder = ConfigBuilder::new(
        Arc::new(clusters_repo),
        Arc::new(routes_repo),
        filters,
        reporter.clone(),
    );
    (builder, reporter)
}

pub fn one_cluster() -> HashMap<String, Cluster> {
    let mut clusters = HashMap::new();
    clusters.insert(
        "cluster1".to_string(),
        Cluster::new("cluster1").with_destination("d1", Destination::new(TEST_ADDRESS)),
    );
    clusters
}

pub fn route(route_id: &str, host: &str, cluster_id: &str) -> ProxyRoute {
    ProxyRoute::new(route_id, cluster_id)
        .with_hosts([host])
        .with_priority(1)
}

/// Error type the throwing filters return.
#[derive(Debug, thiserror::Error)]
#[error("Test exception")]
pub struct NotFiniteNumber;

/// Replaces every route's hosts with "example.com".
pub struct FixRouteHostFilter;

#[async_trait]
impl ConfigFilter for FixRouteHostFilter {
    async fn configure_route(
        &self,
        route: &mut ProxyRoute,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        route.match_.hosts = vec!["example.com".to_string()];
        Ok(())
    }
}

/// Enables health checks on clusters and sets route priority to 12.
pub struct ClusterAndRouteFilter;

#[async_trait]
impl ConfigFilter for ClusterAndRouteFilter {
    async fn configure_cluster(
        &self,
        cluster: &mut Cluster,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        cluster.health_check_options = Some(HealthCheckOptions::enabled(Duration::from_secs(12)));
        Ok(())
    }

    async fn configure_route(
        &self,
        route: &mut ProxyRoute,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        route.priority = 12;
        Ok(())
    }
}

/// Fails on every cluster and route.
pub struct ClusterAndRouteThrows;

#[async_trait]
impl ConfigFilter for ClusterAndRouteThrows {
    async fn configure_cluster(
        &self,
        _cluster: &mut Cluster,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        Err(Box::new(NotFiniteNumber))
    }

    async fn configure_route(
        &self,
        _route: &mut ProxyRoute,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        Err(Box::new(NotFiniteNumber))
    }
}

/// Fails only for the route with the given id.
pub struct RejectRoute(pub &'static str);

#[async_trait]
impl ConfigFilter for RejectRoute {
    async fn configure_route(
        &self,
        route: &mut ProxyRoute,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        if route.route_id == self.0 {
            return Err("rejected by test filter".into());
        }
        Ok(())
    }
}

/// Records "<label>:<route id>" for every route it sees.
pub struct RecordingFilter {
    pub label: &'static str,
    pub events: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ConfigFilter for RecordingFilter {
    async fn configure_route(
        &self,
        route: &mut ProxyRoute,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        tokio::task::yield_now().await;
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, route.route_id));
        Ok(())
    }
}

/// Enables health checks on every cluster at the given interval.
pub struct HealthIntervalFilter(pub Duration);

#[async_trait]
impl ConfigFilter for HealthIntervalFilter {
    async fn configure_cluster(
        &self,
        cluster: &mut Cluster,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        cluster.health_check_options = Some(HealthCheckOptions::enabled(self.0));
        Ok(())
    }
}

/// Cancels the build's token when it sees the given route.
pub struct CancelOnRoute {
    pub route_id: &'static str,
    pub cancel: CancellationToken,
}

#[async_trait]
impl ConfigFilter for CancelOnRoute {
    async fn configure_route(
        &self,
        route: &mut ProxyRoute,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        if route.route_id == self.route_id {
            self.cancel.cancel();
        }
        Ok(())
    }
}

/// Panics on every cluster.
pub struct PanickingFilter;

#[async_trait]
impl ConfigFilter for PanickingFilter {
    async fn configure_cluster(
        &self,
        _cluster: &mut Cluster,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        panic!("filter blew up");
    }
}

/// Clusters repository that is always down.
pub struct FailingClustersRepo;

#[async_trait]
impl ClustersRepo for FailingClustersRepo {
    async fn get_clusters(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Option<HashMap<String, Cluster>>, RepoError> {
        Err(RepoError::Unavailable("store offline".to_string()))
    }
}

/// Routes repository that takes a long time to answer.
pub struct SlowRoutesRepo(pub Duration);

#[async_trait]
impl RoutesRepo for SlowRoutesRepo {
    async fn get_routes(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Option<Vec<ProxyRoute>>, RepoError> {
        tokio::time::sleep(self.0).await;
        Ok(Some(Vec::new()))
    }
}
