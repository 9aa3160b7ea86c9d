//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigBuilder produces:
//!     → errors.rs (one ErrorRecord per rejected entity / failing filter)
//!     → metrics.rs (build outcomes, admitted/rejected counters)
//!     → logging.rs (structured log events, build span with build_id)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Embedders inspecting ErrorRecords through their own ErrorReporter
//! ```
//!
//! # Design Decisions
//! - Error records carry the original error value, never a rendering of it
//! - Reporting is one-way; the build result never includes diagnostics
//! - Metrics are cheap (atomic increments)

pub mod errors;
pub mod logging;
pub mod metrics;

pub use errors::{CollectingErrorReporter, EntityKind, ErrorRecord, ErrorReporter, Stage, TracingErrorReporter};
