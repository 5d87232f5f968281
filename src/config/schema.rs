//! Configuration schema for Shelf
//!
//! Configuration is stored at `~/.config/shelf/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backing for the virtual bot store
///
/// In `Disk` mode the store is a passthrough over the data directory and
/// the local files are authoritative. In `Database` mode the store is
/// backed by an external engine and local files are a working copy that
/// must be synchronized after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Disk,
    Database,
}

impl Default for StorageMode {
    fn default() -> Self {
        Self::Disk
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the bot data tree (contains `bots/` and `global/`)
    pub data_dir: PathBuf,

    /// Storage backing for the virtual bot store
    pub storage: StorageMode,

    /// Application data directory (npm is extracted here when packaged)
    pub app_data_dir: PathBuf,

    /// Whether we are running as a self-contained packaged binary.
    /// Set by the deployment layer, never auto-detected.
    pub packaged: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage: StorageMode::Disk,
            app_data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("shelf"),
            packaged: false,
        }
    }
}

impl Config {
    /// Directory holding a bot's library materialization
    pub fn bot_libraries_dir(&self, bot_id: &str) -> PathBuf {
        self.data_dir.join("bots").join(bot_id).join("libraries")
    }

    /// Path of a named file inside a bot's library directory
    pub fn bot_library_file(&self, bot_id: &str, file_name: &str) -> PathBuf {
        self.bot_libraries_dir(bot_id).join(file_name)
    }

    /// The directory trees observed by the cache invalidation watcher
    pub fn watch_roots(&self) -> [PathBuf; 2] {
        [self.data_dir.join("bots"), self.data_dir.join("global")]
    }
}
