//! Disk-passthrough store backend
//!
//! Maps scopes directly onto the data tree: `bots/<id>/<folder>/<name>`
//! and `global/<folder>/<name>`. In this mode the local filesystem is the
//! authoritative copy, so the engine skips propagation entirely.

use crate::error::{ShelfError, ShelfResult};
use crate::store::{BotStore, Scope};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Store backend passing through to the local data directory
pub struct DiskStore {
    data_dir: PathBuf,
}

impl DiskStore {
    /// Create a disk store rooted at the data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn file_path(&self, scope: &Scope, folder: &str, name: &str) -> PathBuf {
        let base = match scope {
            Scope::Bot(id) => self.data_dir.join("bots").join(id),
            Scope::Global => self.data_dir.join("global"),
        };
        base.join(folder).join(name)
    }
}

#[async_trait]
impl BotStore for DiskStore {
    async fn file_exists(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<bool> {
        Ok(self.file_path(scope, folder, name).exists())
    }

    async fn read_file(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<Vec<u8>> {
        let path = self.file_path(scope, folder, name);
        if !path.exists() {
            return Err(ShelfError::StoreFileNotFound {
                scope: scope.to_string(),
                folder: folder.to_string(),
                name: name.to_string(),
            });
        }

        fs::read(&path)
            .await
            .map_err(|e| ShelfError::io(format!("reading store file {}", path.display()), e))
    }

    async fn upsert_file(
        &self,
        scope: &Scope,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> ShelfResult<()> {
        let path = self.file_path(scope, folder, name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ShelfError::store_write(scope.to_string(), folder, name, e.to_string())
            })?;
        }

        fs::write(&path, content)
            .await
            .map_err(|e| ShelfError::store_write(scope.to_string(), folder, name, e.to_string()))?;

        debug!("Upserted {}", path.display());
        Ok(())
    }

    async fn delete_file(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<()> {
        let path = self.file_path(scope, folder, name);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|e| ShelfError::io(format!("deleting store file {}", path.display()), e))?;
        }
        Ok(())
    }
}
