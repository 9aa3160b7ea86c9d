//! The configuration builder.
//!
//! # Responsibilities
//! - Fetch raw clusters and routes
//! - Drive each entity through the filter chain and validation
//! - Isolate per-entity failures and report them
//! - Assemble the immutable snapshot

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::builder::{BuildError, BuildOptions};
use crate::filters::{FilterChain, FilterFailure};
use crate::model::{Cluster, Configuration, ProxyRoute};
use crate::observability::errors::{EntityKind, ErrorRecord, ErrorReporter, Stage};
use crate::observability::metrics;
use crate::repository::{ClustersRepo, RoutesRepo};
use crate::validation::{ClusterValidator, RouteValidator, ValidationError, ValidationErrors};

/// Builds configuration snapshots from two repositories and a filter chain.
pub struct ConfigBuilder {
    clusters_repo: Arc<dyn ClustersRepo>,
    routes_repo: Arc<dyn RoutesRepo>,
    filters: FilterChain,
    reporter: Arc<dyn ErrorReporter>,
    cluster_validator: ClusterValidator,
    route_validator: RouteValidator,
    options: BuildOptions,
}

impl ConfigBuilder {
    /// Create a builder. Filters run in the chain's registration order.
    pub fn new(
        clusters_repo: Arc<dyn ClustersRepo>,
        routes_repo: Arc<dyn RoutesRepo>,
        filters: FilterChain,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            clusters_repo,
            routes_repo,
            filters,
            reporter,
            cluster_validator: ClusterValidator::new(),
            route_validator: RouteValidator::new(),
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Registered filters.
    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// Build one configuration snapshot.
    ///
    /// Fails only when a repository fails or `cancel` fires; entities that
    /// fail a filter or validation are left out and reported.
    pub async fn build_config(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Configuration, BuildError> {
        let start_time = Instant::now();
        let span = tracing::info_span!("build_config", build_id = %Uuid::new_v4());

        let result = self.build(cancel).instrument(span).await;

        metrics::record_build(BuildError::outcome(&result), start_time);
        if let Ok(config) = &result {
            metrics::record_snapshot(config);
        }
        result
    }

    async fn build(&self, cancel: &CancellationToken) -> Result<Configuration, BuildError> {
        let (raw_clusters, raw_routes) = self.fetch(cancel).await?;
        let (cluster_count, route_count) = (raw_clusters.len(), raw_routes.len());

        let clusters = self.configure_clusters(raw_clusters, cancel).await?;
        let routes = self.configure_routes(raw_routes, cancel).await?;

        tracing::info!(
            clusters = clusters.len(),
            rejected_clusters = cluster_count - clusters.len(),
            routes = routes.len(),
            rejected_routes = route_count - routes.len(),
            "Configuration built"
        );

        Ok(Configuration::new(clusters, routes))
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(HashMap<String, Cluster>, Vec<ProxyRoute>), BuildError> {
        if cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }

        let clusters = async {
            self.clusters_repo
                .get_clusters(cancel)
                .await
                .map_err(BuildError::ClustersFetch)
        };
        let routes = async {
            self.routes_repo
                .get_routes(cancel)
                .await
                .map_err(BuildError::RoutesFetch)
        };

        let (clusters, routes) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BuildError::Cancelled),
            fetched = async { tokio::try_join!(clusters, routes) } => fetched?,
        };

        tracing::debug!(
            clusters = clusters.as_ref().map(HashMap::len),
            routes = routes.as_ref().map(Vec::len),
            "Fetched raw definitions"
        );

        Ok((clusters.unwrap_or_default(), routes.unwrap_or_default()))
    }

    async fn configure_clusters(
        &self,
        raw: HashMap<String, Cluster>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, Cluster>, BuildError> {
        let mut admitted = HashMap::with_capacity(raw.len());

        for (key, mut cluster) in raw {
            if cancel.is_cancelled() {
                return Err(BuildError::Cancelled);
            }

            let failures = self.filters.configure_cluster(&mut cluster, cancel).await?;
            if !failures.is_empty() {
                self.reject_filtered(EntityKind::Cluster, &key, failures);
                continue;
            }

            if let Err(errors) = self.cluster_validator.validate(&key, &cluster) {
                self.reject_invalid(EntityKind::Cluster, &key, errors);
                continue;
            }

            tracing::debug!(cluster_id = %key, destinations = cluster.destinations.len(), "Cluster admitted");
            metrics::record_admitted(EntityKind::Cluster);
            admitted.insert(key, cluster);
        }

        Ok(admitted)
    }

    async fn configure_routes(
        &self,
        raw: Vec<ProxyRoute>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProxyRoute>, BuildError> {
        let mut admitted = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();

        for mut route in raw {
            if cancel.is_cancelled() {
                return Err(BuildError::Cancelled);
            }
            let route_id = route.route_id.clone();

            let failures = self.filters.configure_route(&mut route, cancel).await?;
            if !failures.is_empty() {
                self.reject_filtered(EntityKind::Route, &route_id, failures);
                continue;
            }

            let validation = self.route_validator.validate(&route).and_then(|()| {
                if seen.contains(&route.route_id) {
                    Err(ValidationError::DuplicateRouteId(route.route_id.clone()).into())
                } else {
                    Ok(())
                }
            });
            if let Err(errors) = validation {
                self.reject_invalid(EntityKind::Route, &route_id, errors);
                continue;
            }

            tracing::debug!(route_id = %route.route_id, cluster_id = %route.cluster_id, "Route admitted");
            metrics::record_admitted(EntityKind::Route);
            seen.insert(route.route_id.clone());
            admitted.push(route);
        }

        Ok(admitted)
    }

    fn reject_filtered(&self, kind: EntityKind, entity_id: &str, failures: Vec<FilterFailure>) {
        let mut stage = None;
        for failure in failures {
            let record = ErrorRecord {
                kind,
                entity_id: entity_id.to_string(),
                stage: Stage::Filter {
                    index: failure.index,
                    name: failure.filter,
                },
                cause: Arc::from(failure.cause),
            };
            stage.get_or_insert_with(|| record.stage.clone());
            self.reporter.report(record);
        }
        if let Some(stage) = stage {
            metrics::record_rejected(kind, &stage);
        }
    }

    fn reject_invalid(&self, kind: EntityKind, entity_id: &str, errors: ValidationErrors) {
        metrics::record_rejected(kind, &Stage::Validation);

        if !self.options.report_validation_failures {
            tracing::debug!(entity_kind = %kind, entity_id, error = %errors, "Entity failed validation");
            return;
        }

        self.reporter.report(ErrorRecord {
            kind,
            entity_id: entity_id.to_string(),
            stage: Stage::Validation,
            cause: Arc::new(errors),
        });
    }
}

impl std::fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("filters", &self.filters)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
