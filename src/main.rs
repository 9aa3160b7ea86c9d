//! Reverse proxy configuration builder.
//!
//! Reads raw cluster and route definitions from a TOML file, runs them through
//! the configuration pipeline, and reports the resulting snapshot.
//!
//! # Pipeline Overview
//!
//! ```text
//!     definition file          ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ repository ──▶ filter chain ──▶ validation │
//!                              │                                      │       │
//!                              │                    ┌─────────────────┤       │
//!                              │                    ▼                 ▼       │
//!     snapshot (JSON/log)      │              Configuration      ErrorRecords │
//!     ◀────────────────────────┼──────────────────┘                 │         │
//!                              │                                    ▼         │
//!                              │                            tracing / metrics │
//!                              └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use reverse_proxy_config::builder::{BuildError, ConfigBuilder};
use reverse_proxy_config::config::loader::load_settings;
use reverse_proxy_config::config::watcher::SourceWatcher;
use reverse_proxy_config::config::Settings;
use reverse_proxy_config::filters::{DefaultHealthCheckFilter, FilterChain};
use reverse_proxy_config::observability::{logging, metrics, TracingErrorReporter};
use reverse_proxy_config::repository::FileRepo;

#[derive(Parser)]
#[command(name = "reverse-proxy-config")]
#[command(about = "Build a reverse proxy configuration snapshot from raw definitions", long_about = None)]
struct Cli {
    /// Settings file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Definition file; overrides `source.path` from the settings.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Print each built snapshot as JSON on stdout.
    #[arg(long)]
    print: bool,

    /// Rebuild whenever the definition file changes, until Ctrl+C.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    logging::init_logging(&settings.observability)?;
    tracing::info!("reverse-proxy-config v{} starting", env!("CARGO_PKG_VERSION"));

    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let source = cli
        .source
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.source.path));
    let repo = Arc::new(FileRepo::new(source.clone()));

    let mut filters = FilterChain::new();
    if settings.health_check.apply_defaults {
        filters = filters.with(DefaultHealthCheckFilter::new(&settings.health_check));
    }

    tracing::info!(
        source = ?repo.path(),
        filters = ?filters.names(),
        report_validation_failures = settings.validation.report_failures,
        "Pipeline configured"
    );

    let builder = ConfigBuilder::new(repo.clone(), repo, filters, Arc::new(TracingErrorReporter))
        .with_options(settings.build_options());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            ctrl_c.cancel();
        }
    });

    if !cli.watch {
        build_once(&builder, &cancel, cli.print).await?;
        return Ok(());
    }

    let (watcher, mut rebuilds) = SourceWatcher::new(&source);
    let _watch_handle = watcher.run()?;

    // A failed build is logged; watching continues.
    if let Err(e) = build_once(&builder, &cancel, cli.print).await {
        tracing::error!(error = %e, "Initial build failed");
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            signal = rebuilds.recv() => {
                if signal.is_none() {
                    break;
                }
                while rebuilds.try_recv().is_ok() {}

                match build_once(&builder, &cancel, cli.print).await {
                    Ok(()) => {}
                    Err(BuildError::Cancelled) => break,
                    Err(e) => tracing::error!(error = %e, "Rebuild failed, keeping previous configuration"),
                }
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn build_once(
    builder: &ConfigBuilder,
    cancel: &CancellationToken,
    print: bool,
) -> Result<(), BuildError> {
    let config = builder.build_config(cancel).await?;

    if print {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize configuration"),
        }
    }
    Ok(())
}
