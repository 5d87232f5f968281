//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Shelf - Per-bot shared-library manager
///
/// Manages each bot's isolated dependency environment and keeps the
/// object cache consistent with the on-disk bot trees.
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SHELF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true, env = "SHELF_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a bot's library environment
    Init(InitArgs),

    /// Install a package into a bot's libraries
    Add(AddArgs),

    /// Remove a dependency from a bot's libraries
    Remove(RemoveArgs),

    /// List a bot's declared dependencies
    List(ListArgs),

    /// Run a raw npm command in a bot's library directory
    Sync(SyncArgs),

    /// Watch the data tree and invalidate the object cache on change
    Watch,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Bot identifier
    pub bot_id: String,

    /// Also seed the global example library
    #[arg(long)]
    pub example: bool,
}

/// Arguments for the add command
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Bot identifier
    pub bot_id: String,

    /// Package specifier (name, name@range, or file:archive.tgz)
    pub package: String,
}

/// Arguments for the remove command
#[derive(Parser, Debug)]
pub struct RemoveArgs {
    /// Bot identifier
    pub bot_id: String,

    /// Dependency name to remove
    pub name: String,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Bot identifier
    pub bot_id: String,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Bot identifier
    pub bot_id: String,

    /// npm arguments (defaults to "install")
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,

    /// Run npm in this directory instead of the bot's library directory
    #[arg(long)]
    pub dir: Option<PathBuf>,
}
