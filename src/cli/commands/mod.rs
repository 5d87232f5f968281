//! CLI command implementations

pub mod add;
pub mod init;
pub mod list;
pub mod remove;
pub mod sync;
pub mod watch;

pub use add::execute as add;
pub use init::execute as init;
pub use list::execute as list;
pub use remove::execute as remove;
pub use sync::execute as sync;
pub use watch::execute as watch;

use crate::config::{Config, StorageMode};
use crate::library::LibraryManager;
use crate::store::{BotStore, DiskStore, MemoryStore};
use std::sync::Arc;

/// Build the store backend selected by the configuration.
///
/// Database mode uses the in-memory stand-in here; embedding a real
/// database engine happens outside this binary.
pub(crate) fn build_store(config: &Config) -> Arc<dyn BotStore> {
    match config.storage {
        StorageMode::Disk => Arc::new(DiskStore::new(config.data_dir.clone())),
        StorageMode::Database => Arc::new(MemoryStore::new()),
    }
}

/// Build the library manager over the configured store
pub(crate) fn build_manager(config: &Arc<Config>) -> LibraryManager {
    LibraryManager::new(Arc::clone(config), build_store(config))
}
