//! Error types for Shelf
//!
//! All modules use `ShelfResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Shelf operations
pub type ShelfResult<T> = Result<T, ShelfError>;

/// All errors that can occur in Shelf
#[derive(Error, Debug)]
pub enum ShelfError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // npm resolution errors
    #[error("npm implementation not found at {0}")]
    NpmNotFound(PathBuf),

    #[error("Failed to extract npm to {path}: {reason}")]
    NpmExtract { path: PathBuf, reason: String },

    // Manifest errors
    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    // Execution errors
    #[error("npm command failed: {output}")]
    NpmFailed { output: String },

    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Store errors
    #[error("Store write failed for {scope}/{folder}/{name}: {reason}")]
    StoreWrite {
        scope: String,
        folder: String,
        name: String,
        reason: String,
    },

    #[error("File not found in store: {scope}/{folder}/{name}")]
    StoreFileNotFound {
        scope: String,
        folder: String,
        name: String,
    },

    // Archive errors
    #[error("Failed to pack archive {path}: {reason}")]
    ArchivePack { path: PathBuf, reason: String },

    // Watcher errors
    #[error("Failed to start filesystem watcher: {0}")]
    WatcherInit(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ShelfError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a spawn error
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Create a store write error
    pub fn store_write(
        scope: impl Into<String>,
        folder: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::StoreWrite {
            scope: scope.into(),
            folder: folder.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NpmNotFound(_) => Some("Check the app data directory or reinstall"),
            Self::ConfigInvalid { .. } => Some("Fix or delete the configuration file"),
            _ => None,
        }
    }
}
