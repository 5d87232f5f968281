//! Library manifest model
//!
//! The manifest is a `package.json`-shaped document declaring a bot's
//! shared-library dependencies. Dependency values are source specifiers:
//! either a registry version range (`^4.17.0`) or a `file:` pointer to a
//! packed archive in the library directory (`file:pkg.tgz`).

use crate::error::{ShelfError, ShelfResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File extension of packed dependency archives
pub const ARCHIVE_EXT: &str = ".tgz";

/// A bot's dependency-declaration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub repository: String,

    /// Dependency name → source specifier. BTreeMap keeps keys unique
    /// and the serialized output stable.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    pub author: String,
    pub private: bool,
}

impl Default for LibraryManifest {
    fn default() -> Self {
        Self {
            name: "shared_libs".to_string(),
            version: "1.0.0".to_string(),
            description: "Shared Libraries".to_string(),
            repository: "none".to_string(),
            dependencies: BTreeMap::new(),
            author: String::new(),
            private: true,
        }
    }
}

impl LibraryManifest {
    /// Parse a manifest from JSON bytes
    pub fn parse(content: &[u8]) -> ShelfResult<Self> {
        serde_json::from_slice(content).map_err(|e| ShelfError::ManifestParse {
            path: "package.json".into(),
            reason: e.to_string(),
        })
    }

    /// Read a manifest from a file on disk
    pub async fn from_file(path: &Path) -> ShelfResult<Self> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ShelfError::ManifestRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        serde_json::from_slice(&content).map_err(|e| ShelfError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Serialize to pretty JSON, the way npm itself writes manifests
    pub fn to_json(&self) -> ShelfResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Write the manifest to a file on disk
    pub async fn write_to(&self, path: &Path) -> ShelfResult<()> {
        let content = self.to_json()?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| ShelfError::io(format!("writing manifest {}", path.display()), e))?;
        Ok(())
    }

    /// Look up a dependency's source specifier
    pub fn dependency_source(&self, name: &str) -> Option<&str> {
        self.dependencies.get(name).map(String::as_str)
    }

    /// Remove a dependency entry, returning whether it was present
    pub fn remove_dependency(&mut self, name: &str) -> bool {
        self.dependencies.remove(name).is_some()
    }
}

/// Whether a source specifier points at a local packed archive
pub fn is_archive_source(source: &str) -> bool {
    source.starts_with("file:") && source.ends_with(ARCHIVE_EXT)
}

/// File name of the archive a `file:` specifier points at
pub fn archive_file_name(source: &str) -> &str {
    source.strip_prefix("file:").unwrap_or(source)
}

/// Check that a registry source specifier is a parseable version range.
///
/// `file:` sources are not ranges and always pass.
pub fn validate_source(source: &str) -> ShelfResult<()> {
    if source.starts_with("file:") {
        return Ok(());
    }

    semver::VersionReq::parse(source).map_err(|e| {
        ShelfError::User(format!("invalid version range \"{source}\": {e}"))
    })?;
    Ok(())
}
