//! List command - show a bot's declared dependencies

use crate::cli::args::ListArgs;
use crate::cli::commands::build_store;
use crate::config::Config;
use crate::error::ShelfResult;
use crate::library::LibraryManifest;
use crate::store::BotStoreExt;
use console::style;
use std::sync::Arc;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Arc<Config>) -> ShelfResult<()> {
    let store = build_store(config);
    let scoped = store.bot(&args.bot_id);

    if !scoped.file_exists("libraries", "package.json").await? {
        println!("Bot {} has no libraries yet", style(&args.bot_id).cyan());
        return Ok(());
    }

    let content = scoped.read_file("libraries", "package.json").await?;
    let manifest = LibraryManifest::parse(&content)?;

    if manifest.dependencies.is_empty() {
        println!("No dependencies");
        return Ok(());
    }

    println!("{:<30} {}", style("NAME").bold(), style("SOURCE").bold());
    for (name, source) in &manifest.dependencies {
        println!("{name:<30} {source}");
    }

    Ok(())
}
