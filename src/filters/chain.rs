//! Ordered filter chain.

use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::filters::{ConfigFilter, FilterError};
use crate::model::{Cluster, ProxyRoute};

/// The build was cancelled while a chain was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("configuration build cancelled")]
pub struct Cancelled;

/// A filter panicked while configuring an entity.
#[derive(Debug, thiserror::Error)]
#[error("filter '{filter}' panicked: {message}")]
pub struct FilterPanicked {
    pub filter: String,
    pub message: String,
}

/// One failing filter invocation.
#[derive(Debug)]
pub struct FilterFailure {
    /// Position of the filter in the chain.
    pub index: usize,
    /// Name of the filter.
    pub filter: String,
    /// The error exactly as the filter returned it.
    pub cause: FilterError,
}

/// Filters in registration order.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn ConfigFilter>>,
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

impl FilterChain {
    /// Create an empty chain (pass-through).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter; it runs after every filter registered before it.
    pub fn with<F: ConfigFilter + 'static>(mut self, filter: F) -> Self {
        self.push(Arc::new(filter));
        self
    }

    /// Append an already shared filter.
    pub fn push(&mut self, filter: Arc<dyn ConfigFilter>) {
        tracing::debug!(filter = filter.name(), position = self.filters.len(), "Registered config filter");
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filter names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every filter against a cluster, returning the failures.
    pub async fn configure_cluster(
        &self,
        cluster: &mut Cluster,
        cancel: &CancellationToken,
    ) -> Result<Vec<FilterFailure>, Cancelled> {
        let mut failures = Vec::new();
        for (index, filter) in self.filters.iter().enumerate() {
            let call = filter.configure_cluster(cluster, cancel);
            if let Some(failure) = invoke(index, filter.name(), call, cancel).await? {
                failures.push(failure);
            }
        }
        Ok(failures)
    }

    /// Run every filter against a route, returning the failures.
    pub async fn configure_route(
        &self,
        route: &mut ProxyRoute,
        cancel: &CancellationToken,
    ) -> Result<Vec<FilterFailure>, Cancelled> {
        let mut failures = Vec::new();
        for (index, filter) in self.filters.iter().enumerate() {
            let call = filter.configure_route(route, cancel);
            if let Some(failure) = invoke(index, filter.name(), call, cancel).await? {
                failures.push(failure);
            }
        }
        Ok(failures)
    }
}

/// Await one filter call, racing it against cancellation and containing panics.
async fn invoke<F>(
    index: usize,
    name: &str,
    call: F,
    cancel: &CancellationToken,
) -> Result<Option<FilterFailure>, Cancelled>
where
    F: Future<Output = Result<(), FilterError>>,
{
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Cancelled),
        outcome = AssertUnwindSafe(call).catch_unwind() => outcome,
    };

    let cause = match outcome {
        Ok(Ok(())) => return Ok(None),
        Ok(Err(cause)) => cause,
        Err(payload) => Box::new(FilterPanicked {
            filter: name.to_string(),
            message: panic_message(payload.as_ref()),
        }) as FilterError,
    };

    Ok(Some(FilterFailure {
        index,
        filter: name.to_string(),
        cause,
    }))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
