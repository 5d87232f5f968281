//! Filesystem-driven cache invalidation
//!
//! Watches the `bots/` and `global/` data trees and discards cache
//! entries when files change out-of-band (editors, sync jobs, the npm
//! engine itself). Package-manager internals (`node_modules`) are ignored
//! so installs don't trigger invalidation storms.

use crate::cache::ObjectCache;
use crate::config::Config;
use crate::error::{ShelfError, ShelfResult};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Directory names excluded from invalidation handling
const IGNORED_DIRS: &[&str] = &["node_modules"];

/// Watches the data trees and invalidates the object cache on change.
///
/// One instance per process. `install` starts monitoring; `stop` releases
/// the watch handles and is safe to call even if `install` never ran.
pub struct FileChangedInvalidator {
    roots: [PathBuf; 2],
    handle: Option<WatchHandle>,
}

struct WatchHandle {
    // Dropping the notify watcher stops filesystem monitoring.
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl FileChangedInvalidator {
    /// Create an invalidator for the configured data tree
    pub fn new(config: &Config) -> Self {
        Self {
            roots: config.watch_roots(),
            handle: None,
        }
    }

    /// Begin monitoring the `bots/` and `global/` trees.
    ///
    /// Existing files produce no events; only changes after installation
    /// are observed. Missing roots are skipped with a warning.
    pub fn install(&mut self, cache: Arc<ObjectCache>) -> ShelfResult<()> {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = raw_tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|e| ShelfError::WatcherInit(e.to_string()))?;

        for root in &self.roots {
            if root.exists() {
                match watcher.watch(root, RecursiveMode::Recursive) {
                    Ok(()) => info!(root = %root.display(), "Watching data tree"),
                    Err(e) => warn!(root = %root.display(), error = %e, "Failed to watch root"),
                }
            } else {
                warn!(root = %root.display(), "Watch root does not exist, skipping");
            }
        }

        let roots = self.roots.clone();
        let task = tokio::spawn(run_loop(raw_rx, roots, cache));

        self.handle = Some(WatchHandle {
            _watcher: watcher,
            task,
        });
        Ok(())
    }

    /// Release the watch handles. No-op when never installed.
    pub fn stop(&mut self) {
        match self.handle.take() {
            Some(handle) => {
                handle.task.abort();
                info!("Cache invalidation watcher stopped");
            }
            None => debug!("Watcher stop requested but none installed"),
        }
    }
}

impl Drop for FileChangedInvalidator {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    roots: [PathBuf; 2],
    cache: Arc<ObjectCache>,
) {
    while let Some(result) = raw_rx.recv().await {
        match result {
            Ok(event) => handle_event(&event, &roots, &cache),
            // Watcher errors are reported but never stop the loop.
            Err(e) => warn!(error = %e, "Filesystem watcher error"),
        }
    }
    debug!("Watcher channel closed");
}

fn handle_event(event: &Event, roots: &[PathBuf; 2], cache: &ObjectCache) {
    // Renames surface as create/remove pairs, so these three suffice.
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return,
    }

    for path in &event.paths {
        if is_in_ignored_dir(path) {
            continue;
        }

        if let Some(relative) = relative_to_roots(path, roots) {
            debug!(path = %relative, kind = ?event.kind, "File change detected");
            cache.invalidate_file(&relative);
        }
    }
}

/// Check if a path contains any ignored directory component
fn is_in_ignored_dir(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| IGNORED_DIRS.contains(&s))
    })
}

/// Express a changed path relative to its watch root, forward-slashed
fn relative_to_roots(path: &Path, roots: &[PathBuf; 2]) -> Option<String> {
    roots
        .iter()
        .find_map(|root| path.strip_prefix(root).ok())
        .map(forward_slashes)
}

/// Join path components with `/` regardless of platform separators
fn forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
