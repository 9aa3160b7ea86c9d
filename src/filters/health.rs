//! Built-in filter applying default health check options.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::HealthCheckConfig;
use crate::filters::{ConfigFilter, FilterError};
use crate::model::{Cluster, HealthCheckOptions};

/// Gives clusters without health check options the configured defaults.
///
/// Clusters that already carry options are left untouched.
#[derive(Debug, Clone)]
pub struct DefaultHealthCheckFilter {
    defaults: HealthCheckOptions,
}

impl DefaultHealthCheckFilter {
    pub fn new(config: &HealthCheckConfig) -> Self {
        Self {
            defaults: HealthCheckOptions {
                enabled: config.enabled,
                interval: Duration::from_secs(config.interval_secs),
                timeout: Some(Duration::from_secs(config.timeout_secs)),
                path: Some(config.path.clone()),
            },
        }
    }
}

#[async_trait]
impl ConfigFilter for DefaultHealthCheckFilter {
    fn name(&self) -> &str {
        "default-health-check"
    }

    async fn configure_cluster(
        &self,
        cluster: &mut Cluster,
        _cancel: &CancellationToken,
    ) -> Result<(), FilterError> {
        if cluster.health_check_options.is_none() {
            tracing::trace!(cluster_id = %cluster.id, "Applying default health check options");
            cluster.health_check_options = Some(self.defaults.clone());
        }
        Ok(())
    }
}
