//! Definition file watcher for hot rebuilds.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Watches the raw definition file and signals when a rebuild is due.
pub struct SourceWatcher {
    path: PathBuf,
    rebuild_tx: mpsc::UnboundedSender<()>,
}

impl SourceWatcher {
    /// Create a new SourceWatcher.
    ///
    /// Returns the watcher and a receiver of rebuild signals.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (rebuild_tx, rebuild_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                rebuild_tx,
            },
            rebuild_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.rebuild_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(paths = ?event.paths, "Definition file changed, scheduling rebuild");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Source watcher started");
        Ok(watcher)
    }
}
