//! Entity model for the configuration pipeline.
//!
//! # Data Flow
//! ```text
//! repository (raw, mutable)
//!     → Cluster / ProxyRoute (owned per build)
//!     → config filters mutate in place
//!     → validators inspect
//!     → Configuration (immutable snapshot)
//! ```
//!
//! # Design Decisions
//! - Entities are plain owned values; every build works on its own copies
//! - Serde derives so raw definitions can be loaded from TOML documents
//! - Durations are expressed in whole milliseconds on the wire (`*_ms` fields)

pub mod cluster;
pub mod route;
pub mod snapshot;

pub use cluster::{Cluster, Destination, HealthCheckOptions, LoadBalancingMode};
pub use route::{ProxyMatch, ProxyRoute};
pub use snapshot::Configuration;

/// Serde helpers for `Duration` values stored as whole milliseconds.
pub(crate) mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    fn to_millis(value: &Duration) -> u64 {
        u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(to_millis(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => serializer.serialize_some(&super::to_millis(d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<u64>::deserialize(deserializer).map(|v| v.map(Duration::from_millis))
        }
    }
}
