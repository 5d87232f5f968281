//! Watch command - run the cache invalidation watcher

use crate::cache::{FileChangedInvalidator, ObjectCache};
use crate::config::{Config, ConfigManager};
use crate::error::{ShelfError, ShelfResult};
use console::style;
use std::sync::Arc;
use tracing::info;

/// Execute the watch command.
///
/// Installs the invalidator over the data tree and prints invalidation
/// events until interrupted.
pub async fn execute(config: &Arc<Config>) -> ShelfResult<()> {
    ConfigManager::ensure_data_dirs(config).await?;

    let cache = Arc::new(ObjectCache::new());
    let mut events = cache.subscribe();

    let mut invalidator = FileChangedInvalidator::new(config);
    invalidator.install(Arc::clone(&cache))?;

    println!(
        "Watching {} (press Ctrl-C to stop)",
        style(config.data_dir.display()).cyan()
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(|e| ShelfError::io("waiting for interrupt", e))?;
                break;
            }
            event = events.recv() => {
                match event {
                    Ok(payload) => println!("invalidated {payload}"),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        info!(skipped = n, "Invalidation events lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    invalidator.stop();
    println!("Stopped");
    Ok(())
}
