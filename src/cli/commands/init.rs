//! Init command - set up a bot's library environment

use crate::cli::args::InitArgs;
use crate::cli::commands::build_manager;
use crate::config::Config;
use crate::error::ShelfResult;
use console::style;
use std::sync::Arc;

/// Execute the init command
pub async fn execute(args: InitArgs, config: &Arc<Config>) -> ShelfResult<()> {
    let manager = build_manager(config);

    let already = manager.is_initialized(&args.bot_id).await?;
    manager.initialize(&args.bot_id).await?;

    if args.example {
        manager.create_default_example().await?;
        println!("Seeded global example library");
    }

    if already {
        println!(
            "Bot {} already initialized",
            style(&args.bot_id).cyan().bold()
        );
    } else {
        println!(
            "{} Initialized libraries for bot {}",
            style("✓").green(),
            style(&args.bot_id).cyan().bold()
        );
    }

    Ok(())
}
