//! Error records for rejected configuration entities.
//!
//! # Responsibilities
//! - Describe which entity was rejected, at which stage, and why
//! - Deliver records to a sink (structured logs by default)
//!
//! # Design Decisions
//! - The cause is shared, not rendered, so callers can downcast it
//! - One record per failing filter invocation; one per failed validation

use std::fmt;
use std::sync::{Arc, Mutex};

/// Kind of entity an error record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Cluster,
    Route,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Cluster => "cluster",
            EntityKind::Route => "route",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage that rejected an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A config filter failed. `index` is its position in the chain.
    Filter { index: usize, name: String },
    /// Validation after a successful filter chain.
    Validation,
}

impl Stage {
    /// Low-cardinality label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Filter { .. } => "filter",
            Stage::Validation => "validation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Filter { index, name } => write!(f, "filter #{index} ({name})"),
            Stage::Validation => f.write_str("validation"),
        }
    }
}

/// Diagnostic entry for a rejected entity.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub kind: EntityKind,
    /// Cluster key or route id as it appeared in the source.
    pub entity_id: String,
    pub stage: Stage,
    /// The error exactly as the filter or validator produced it.
    pub cause: Arc<dyn std::error::Error + Send + Sync>,
}

impl ErrorRecord {
    /// Inspect the cause as a concrete error type.
    pub fn cause_as<T: std::error::Error + 'static>(&self) -> Option<&T> {
        self.cause.downcast_ref::<T>()
    }
}

/// Sink for error records.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, record: ErrorRecord);
}

/// Reports records as structured `error` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, record: ErrorRecord) {
        log_record(&record);
    }
}

fn log_record(record: &ErrorRecord) {
    tracing::error!(
        entity_kind = %record.kind,
        entity_id = %record.entity_id,
        stage = %record.stage,
        error = %record.cause,
        "Configuration entity rejected"
    );
}

/// Logs records and keeps them for later inspection.
#[derive(Debug, Default)]
pub struct CollectingErrorReporter {
    records: Mutex<Vec<ErrorRecord>>,
}

impl CollectingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records reported so far, in reporting order.
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.lock().clone()
    }

    /// Remove and return all records.
    pub fn take(&self) -> Vec<ErrorRecord> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ErrorRecord>> {
        self.records.lock().expect("error reporter mutex poisoned")
    }
}

impl ErrorReporter for CollectingErrorReporter {
    fn report(&self, record: ErrorRecord) {
        log_record(&record);
        self.lock().push(record);
    }
}
