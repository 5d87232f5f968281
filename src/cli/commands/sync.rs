//! Sync command - run a raw npm command for a bot

use crate::cli::args::SyncArgs;
use crate::cli::commands::build_manager;
use crate::config::Config;
use crate::error::ShelfResult;
use std::sync::Arc;
use tracing::warn;

/// Execute the sync command
pub async fn execute(args: SyncArgs, config: &Arc<Config>) -> ShelfResult<()> {
    let manager = build_manager(config);
    manager.initialize(&args.bot_id).await?;

    if config.packaged {
        // The alias only matters for post-install scripts; a failure
        // must not block the npm run itself.
        if let Err(e) = manager.create_node_symlink().await {
            warn!(error = %e, "Couldn't create node symlink");
        }
    }

    let npm_args = if args.args.is_empty() {
        vec!["install".to_string()]
    } else {
        args.args.clone()
    };

    let output = manager
        .execute_npm(&args.bot_id, &npm_args, args.dir.as_deref())
        .await?;
    print!("{output}");
    Ok(())
}
