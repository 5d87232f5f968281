//! Add command - install a package into a bot's libraries

use crate::cli::args::AddArgs;
use crate::cli::commands::build_manager;
use crate::config::Config;
use crate::error::ShelfResult;
use crate::library::manifest;
use console::style;
use std::sync::Arc;

/// Execute the add command
pub async fn execute(args: AddArgs, config: &Arc<Config>) -> ShelfResult<()> {
    // Reject malformed version ranges before npm sees them.
    if let Some((_, range)) = args.package.rsplit_once('@').filter(|(name, _)| !name.is_empty()) {
        manifest::validate_source(range)?;
    }

    let manager = build_manager(config);
    manager.initialize(&args.bot_id).await?;

    let output = manager
        .execute_npm(
            &args.bot_id,
            &["install".to_string(), args.package.clone()],
            None,
        )
        .await?;

    print!("{output}");
    println!(
        "{} Installed {} for bot {}",
        style("✓").green(),
        style(&args.package).bold(),
        style(&args.bot_id).cyan().bold()
    );
    Ok(())
}
