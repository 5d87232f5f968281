//! Shelf - Per-bot shared-library manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use shelf::cli::{Cli, Commands};
use shelf::config::ConfigManager;
use shelf::error::ShelfResult;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ShelfResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("shelf=warn"),
        1 => EnvFilter::new("shelf=info"),
        _ => EnvFilter::new("shelf=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let mut config = config_manager.load().await?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let config = Arc::new(config);

    // Dispatch to command
    match cli.command {
        Commands::Init(args) => shelf::cli::commands::init(args, &config).await,
        Commands::Add(args) => shelf::cli::commands::add(args, &config).await,
        Commands::Remove(args) => shelf::cli::commands::remove(args, &config).await,
        Commands::List(args) => shelf::cli::commands::list(args, &config).await,
        Commands::Sync(args) => shelf::cli::commands::sync(args, &config).await,
        Commands::Watch => shelf::cli::commands::watch(&config).await,
    }
}
