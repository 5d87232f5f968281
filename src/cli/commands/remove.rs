//! Remove command - drop a dependency and reconcile the tree

use crate::cli::args::RemoveArgs;
use crate::cli::commands::build_manager;
use crate::config::Config;
use crate::error::{ShelfError, ShelfResult};
use console::style;
use std::sync::Arc;

/// Execute the remove command
pub async fn execute(args: RemoveArgs, config: &Arc<Config>) -> ShelfResult<()> {
    let manager = build_manager(config);

    let removed = manager.remove_library(&args.bot_id, &args.name).await?;
    if !removed {
        // The engine reports both an absent entry and an unreadable
        // manifest as "not removed"; only the logs distinguish them.
        return Err(ShelfError::User(format!(
            "Dependency not found (or manifest unreadable, see logs): {}",
            args.name
        )));
    }

    println!(
        "{} Removed {} from bot {}",
        style("✓").green(),
        style(&args.name).bold(),
        style(&args.bot_id).cyan().bold()
    );
    Ok(())
}
