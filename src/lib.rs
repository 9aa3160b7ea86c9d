//! Dynamic configuration build pipeline for a reverse proxy.
//!
//! Raw cluster and route definitions are fetched from repositories, passed
//! through an ordered chain of config filters, validated, and assembled into
//! an immutable [`Configuration`] snapshot for the data plane.

pub mod builder;
pub mod config;
pub mod filters;
pub mod model;
pub mod observability;
pub mod repository;
pub mod validation;

pub use builder::{BuildError, BuildOptions, ConfigBuilder};
pub use config::Settings;
pub use filters::{ConfigFilter, FilterChain, FilterError};
pub use model::{Cluster, Configuration, Destination, HealthCheckOptions, ProxyMatch, ProxyRoute};
pub use observability::{ErrorRecord, ErrorReporter};
pub use repository::{ClustersRepo, RepoError, RoutesRepo};
