//! Settings for the configuration pipeline binary.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!
//! While running with --watch:
//!     watcher.rs detects a change to the definition file
//!     → rebuild signal
//!     → ConfigBuilder::build_config
//! ```
//!
//! # Design Decisions
//! - Every section has defaults so an empty (or missing) file is valid
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::HealthCheckConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::Settings;
pub use schema::SourceConfig;
pub use schema::ValidationConfig;
