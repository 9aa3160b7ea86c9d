//! Behaviour of the configuration builder against in-memory repositories.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use reverse_proxy_config::builder::{BuildError, BuildOptions, ConfigBuilder};
use reverse_proxy_config::filters::{FilterChain, FilterPanicked};
use reverse_proxy_config::model::{Cluster, Destination};
use reverse_proxy_config::observability::{CollectingErrorReporter, EntityKind, Stage};
use reverse_proxy_config::repository::{
    ClustersRepo, InMemoryClustersRepo, InMemoryRoutesRepo, RepoError, RoutesRepo,
};
use reverse_proxy_config::validation::{ClusterValidator, ValidationError, ValidationErrors};

mod common;

use common::*;

#[test]
fn test_constructor_works() {
    let (builder, reporter) = create_builder(None, None, FilterChain::new());
    assert!(builder.filters().is_empty());
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn test_absent_input_works() {
    let (builder, reporter) = create_builder(None, None, FilterChain::new());

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(reporter.is_empty());
    assert!(result.clusters().is_empty());
    assert!(result.routes().is_empty());
}

#[tokio::test]
async fn test_empty_input_works() {
    let (builder, reporter) = create_builder(Some(Default::default()), Some(Vec::new()), FilterChain::new());

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(reporter.is_empty());
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_one_cluster_works() {
    let (builder, reporter) = create_builder(Some(one_cluster()), None, FilterChain::new());

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(reporter.is_empty());
    assert_eq!(result.clusters().len(), 1);
    let cluster = result.cluster("cluster1").unwrap();
    assert_eq!(cluster.id, "cluster1");
    assert_eq!(cluster.destinations.len(), 1);
    assert_eq!(cluster.destinations["d1"].address, TEST_ADDRESS);
}

#[tokio::test]
async fn test_valid_route_works() {
    let route1 = route("route1", "example.com", "cluster1");
    let (builder, reporter) = create_builder(None, Some(vec![route1.clone()]), FilterChain::new());

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(reporter.is_empty());
    assert!(result.clusters().is_empty());
    assert_eq!(result.routes(), &[route1]);
}

#[tokio::test]
async fn test_route_cluster_reference_not_checked() {
    let (builder, reporter) = create_builder(
        Some(one_cluster()),
        Some(vec![route("route1", "example.com", "no-such-cluster")]),
        FilterChain::new(),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(reporter.is_empty());
    assert_eq!(result.routes().len(), 1);
}

#[tokio::test]
async fn test_route_validation_error_skips_route() {
    let (builder, reporter) = create_builder(
        None,
        Some(vec![route("route1", "invalid host name", "cluster1")]),
        FilterChain::new(),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(result.clusters().is_empty());
    assert!(result.routes().is_empty());

    let records = reporter.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, EntityKind::Route);
    assert_eq!(records[0].entity_id, "route1");
    assert_eq!(records[0].stage, Stage::Validation);
    let errors = records[0].cause_as::<ValidationErrors>().unwrap();
    assert_eq!(
        errors.errors(),
        &[ValidationError::InvalidHost("invalid host name".to_string())]
    );
}

#[tokio::test]
async fn test_validation_reporting_can_be_disabled() {
    let (builder, reporter) = create_builder(
        None,
        Some(vec![route("route1", "invalid host name", "cluster1")]),
        FilterChain::new(),
    );
    let builder = builder.with_options(BuildOptions {
        report_validation_failures: false,
    });

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(result.routes().is_empty());
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn test_filter_can_fix_broken_route() {
    let (builder, reporter) = create_builder(
        None,
        Some(vec![route("route1", "invalid host name", "cluster1")]),
        FilterChain::new().with(FixRouteHostFilter),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(reporter.is_empty());
    assert!(result.clusters().is_empty());
    assert_eq!(result.routes().len(), 1);
    let built = &result.routes()[0];
    assert_eq!(built.route_id, "route1");
    assert_eq!(built.match_.hosts, vec!["example.com".to_string()]);
}

#[tokio::test]
async fn test_filter_configures_cluster() {
    let (builder, reporter) = create_builder(
        Some(one_cluster()),
        None,
        FilterChain::new().with(ClusterAndRouteFilter),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(reporter.is_empty());
    let cluster = result.cluster("cluster1").unwrap();
    let health = cluster.health_check_options.as_ref().unwrap();
    assert!(health.enabled);
    assert_eq!(health.interval, Duration::from_secs(12));
    assert_eq!(cluster.destinations.len(), 1);
    assert_eq!(cluster.destinations["d1"].address, TEST_ADDRESS);
}

#[tokio::test]
async fn test_cluster_filter_failure_skips_cluster() {
    let (builder, reporter) = create_builder(
        Some(one_cluster()),
        None,
        FilterChain::new().with(ClusterAndRouteThrows),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(result.clusters().is_empty());
    let records = reporter.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, EntityKind::Cluster);
    assert_eq!(records[0].entity_id, "cluster1");
    assert!(records[0].cause_as::<NotFiniteNumber>().is_some());
}

#[tokio::test]
async fn test_two_failing_cluster_filters_report_twice() {
    let (builder, reporter) = create_builder(
        Some(one_cluster()),
        None,
        FilterChain::new()
            .with(ClusterAndRouteThrows)
            .with(ClusterAndRouteThrows),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(result.clusters().is_empty());
    let records = reporter.records();
    assert_eq!(records.len(), 2);
    for (index, record) in records.iter().enumerate() {
        assert!(record.cause_as::<NotFiniteNumber>().is_some());
        assert!(matches!(&record.stage, Stage::Filter { index: i, .. } if *i == index));
    }
}

#[tokio::test]
async fn test_route_filter_actions_work() {
    let routes_repo = Arc::new(InMemoryRoutesRepo::with_routes(vec![route(
        "route1",
        "example.com",
        "cluster1",
    )]));
    let reporter = Arc::new(CollectingErrorReporter::new());
    let builder = ConfigBuilder::new(
        Arc::new(InMemoryClustersRepo::new()),
        routes_repo.clone(),
        FilterChain::new().with(ClusterAndRouteFilter),
        reporter.clone(),
    );
    let cancel = CancellationToken::new();

    let result = builder.build_config(&cancel).await.unwrap();

    assert!(reporter.is_empty());
    assert_eq!(result.routes().len(), 1);
    assert_eq!(result.routes()[0].route_id, "route1");
    assert_eq!(result.routes()[0].priority, 12);

    // The stored definition is not touched by the build.
    let stored = routes_repo.get_routes(&cancel).await.unwrap().unwrap();
    assert_eq!(stored[0].priority, 1);
}

#[tokio::test]
async fn test_route_filter_failure_skips_routes() {
    let (builder, reporter) = create_builder(
        None,
        Some(vec![
            route("route1", "example.com", "cluster1"),
            route("route2", "example2.com", "cluster2"),
        ]),
        FilterChain::new()
            .with(ClusterAndRouteThrows)
            .with(ClusterAndRouteThrows),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(result.clusters().is_empty());
    assert!(result.routes().is_empty());

    let records = reporter.records();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.cause_as::<NotFiniteNumber>().is_some()));
    let ids: Vec<_> = records.iter().map(|r| r.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["route1", "route1", "route2", "route2"]);
}

#[tokio::test]
async fn test_route_failures_are_isolated() {
    let good = route("good", "good.example.com", "cluster1");
    let (builder, reporter) = create_builder(
        None,
        Some(vec![route("bad", "bad.example.com", "cluster1"), good.clone()]),
        FilterChain::new().with(RejectRoute("bad")),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert_eq!(result.routes(), &[good]);
    let records = reporter.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entity_id, "bad");
    assert_eq!(records[0].cause.to_string(), "rejected by test filter");
}

#[tokio::test]
async fn test_admitted_routes_keep_input_order() {
    let routes = vec![
        route("c", "c.example.com", "x"),
        route("skip", "bad host", "x"),
        route("a", "a.example.com", "x"),
        route("b", "b.example.com", "x"),
    ];
    let (builder, _reporter) = create_builder(None, Some(routes), FilterChain::new());

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    let ids: Vec<_> = result.routes().iter().map(|r| r.route_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_each_route_finishes_its_chain_first() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let filters = FilterChain::new()
        .with(RecordingFilter {
            label: "first",
            events: events.clone(),
        })
        .with(RecordingFilter {
            label: "second",
            events: events.clone(),
        });
    let (builder, _reporter) = create_builder(
        None,
        Some(vec![
            route("r1", "one.example.com", "x"),
            route("r2", "two.example.com", "x"),
        ]),
        filters,
    );

    builder.build_config(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec!["first:r1", "second:r1", "first:r2", "second:r2"]
    );
}

#[tokio::test]
async fn test_builds_are_idempotent() {
    let (builder, reporter) = create_builder(
        Some(one_cluster()),
        Some(vec![
            route("route1", "example.com", "cluster1"),
            route("route2", "invalid host", "cluster1"),
        ]),
        FilterChain::new().with(ClusterAndRouteFilter),
    );
    let cancel = CancellationToken::new();

    let first = builder.build_config(&cancel).await.unwrap();
    let second = builder.build_config(&cancel).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.routes().len(), 1);
    assert_eq!(reporter.len(), 2);
}

#[tokio::test]
async fn test_cancelled_before_build() {
    let (builder, reporter) = create_builder(Some(one_cluster()), None, FilterChain::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = builder.build_config(&cancel).await.unwrap_err();

    assert!(matches!(err, BuildError::Cancelled));
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn test_cancelled_during_fetch() {
    let builder = ConfigBuilder::new(
        Arc::new(InMemoryClustersRepo::new()),
        Arc::new(SlowRoutesRepo(Duration::from_secs(30))),
        FilterChain::new(),
        Arc::new(CollectingErrorReporter::new()),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), builder.build_config(&cancel))
        .await
        .expect("cancellation should abort the fetch promptly");

    assert!(matches!(result, Err(BuildError::Cancelled)));
}

#[tokio::test]
async fn test_fetch_failure_fails_build() {
    let reporter = Arc::new(CollectingErrorReporter::new());
    let builder = ConfigBuilder::new(
        Arc::new(FailingClustersRepo),
        Arc::new(InMemoryRoutesRepo::with_routes(vec![route("r1", "example.com", "c1")])),
        FilterChain::new(),
        reporter.clone(),
    );

    let err = builder.build_config(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, BuildError::ClustersFetch(RepoError::Unavailable(_))));
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn test_panicking_filter_only_rejects_entity() {
    let mut clusters = one_cluster();
    clusters.insert(
        "cluster2".to_string(),
        Cluster::new("cluster2"),
    );
    let (builder, reporter) = create_builder(
        Some(clusters),
        Some(vec![route("route1", "example.com", "cluster1")]),
        FilterChain::new().with(PanickingFilter),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert!(result.clusters().is_empty());
    assert_eq!(result.routes().len(), 1);
    let records = reporter.records();
    assert_eq!(records.len(), 2);
    let panicked = records[0].cause_as::<FilterPanicked>().unwrap();
    assert_eq!(panicked.message, "filter blew up");
}

#[tokio::test]
async fn test_duplicate_route_id_rejected() {
    let (builder, reporter) = create_builder(
        None,
        Some(vec![
            route("route1", "first.example.com", "c1"),
            route("route1", "second.example.com", "c1"),
        ]),
        FilterChain::new(),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert_eq!(result.routes().len(), 1);
    assert_eq!(result.routes()[0].match_.hosts, vec!["first.example.com".to_string()]);
    let records = reporter.records();
    assert_eq!(records.len(), 1);
    let errors = records[0].cause_as::<ValidationErrors>().unwrap();
    assert_eq!(
        errors.errors(),
        &[ValidationError::DuplicateRouteId("route1".to_string())]
    );
}

#[tokio::test]
async fn test_cluster_key_mismatch_rejected() {
    let mut clusters = one_cluster();
    clusters.insert("alias".to_string(), Cluster::new("cluster2"));
    let (builder, reporter) = create_builder(Some(clusters), None, FilterChain::new());

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    assert_eq!(result.clusters().len(), 1);
    assert!(result.cluster("cluster1").is_some());
    let records = reporter.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entity_id, "alias");
    assert_eq!(records[0].stage, Stage::Validation);
}

#[tokio::test]
async fn test_destination_addresses_are_opaque() {
    let mut clusters = std::collections::HashMap::new();
    for (id, address) in [("c1", "10.0.0.1:8080"), ("c2", "localhost:5000"), ("c3", TEST_ADDRESS)] {
        clusters.insert(
            id.to_string(),
            Cluster::new(id).with_destination("d1", Destination::new(address)),
        );
    }
    let (builder, reporter) = create_builder(Some(clusters), None, FilterChain::new());

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();

    let mut ids: Vec<_> = result.clusters().keys().cloned().collect();
    ids.sort();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(result.cluster("c1").unwrap().destinations["d1"].address, "10.0.0.1:8080");
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn test_sub_second_interval_survives_snapshot() {
    let (builder, reporter) = create_builder(
        Some(one_cluster()),
        None,
        FilterChain::new().with(HealthIntervalFilter(Duration::from_millis(500))),
    );

    let result = builder.build_config(&CancellationToken::new()).await.unwrap();
    assert!(reporter.is_empty());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["clusters"]["cluster1"]["health_check_options"]["interval_ms"], 500);

    let reloaded: Cluster = serde_json::from_value(json["clusters"]["cluster1"].clone()).unwrap();
    assert_eq!(&reloaded, result.cluster("cluster1").unwrap());
    assert!(ClusterValidator::new().validate("cluster1", &reloaded).is_ok());
}

#[tokio::test]
async fn test_cancelled_during_route_pass() {
    let cancel = CancellationToken::new();
    let filters = FilterChain::new().with(CancelOnRoute {
        route_id: "route1",
        cancel: cancel.clone(),
    });
    let (builder, reporter) = create_builder(
        Some(one_cluster()),
        Some(vec![
            route("route1", "example.com", "cluster1"),
            route("route2", "example.org", "cluster1"),
        ]),
        filters,
    );

    let err = builder.build_config(&cancel).await.unwrap_err();

    assert!(matches!(err, BuildError::Cancelled));
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn test_concurrent_builds_are_isolated() {
    let clusters_repo = Arc::new(InMemoryClustersRepo::with_clusters(one_cluster()));
    let routes_repo = Arc::new(InMemoryRoutesRepo::with_routes(vec![
        route("route1", "example.com", "cluster1"),
        route("route2", "example.org", "cluster1"),
    ]));
    let events = Arc::new(Mutex::new(Vec::new()));
    let filters = FilterChain::new()
        .with(ClusterAndRouteFilter)
        .with(RecordingFilter {
            label: "seen",
            events: events.clone(),
        })
        .with(FixRouteHostFilter);
    let builder = ConfigBuilder::new(
        clusters_repo.clone(),
        routes_repo.clone(),
        filters,
        Arc::new(CollectingErrorReporter::new()),
    );
    let cancel = CancellationToken::new();

    let (first, second) = tokio::join!(builder.build_config(&cancel), builder.build_config(&cancel));
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first, second);
    assert_eq!(first.routes().len(), 2);
    assert!(first.routes().iter().all(|r| r.priority == 12));
    assert!(first.routes().iter().all(|r| r.match_.hosts == vec!["example.com".to_string()]));
    assert_eq!(events.lock().unwrap().len(), 4);

    let stored_routes = routes_repo.get_routes(&cancel).await.unwrap().unwrap();
    assert_eq!(stored_routes[1].match_.hosts, vec!["example.org".to_string()]);
    assert!(stored_routes.iter().all(|r| r.priority == 1));
    let stored_clusters = clusters_repo.get_clusters(&cancel).await.unwrap().unwrap();
    assert_eq!(stored_clusters, one_cluster());
}
