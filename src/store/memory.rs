//! In-memory store backend
//!
//! Stands in for the external database-backed store engine wherever a
//! second backend is needed (tests, embedding without a database). Keys
//! follow the same `<scope>/<folder>/<name>` layout as the disk backend.

use crate::error::{ShelfError, ShelfResult};
use crate::store::{BotStore, Scope};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Store backend keeping all files in process memory
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(scope: &Scope, folder: &str, name: &str) -> String {
        format!("{scope}/{folder}/{name}")
    }

    /// Number of upserts performed, for idempotence assertions in tests
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BotStore for MemoryStore {
    async fn file_exists(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<bool> {
        let files = self.files.lock().expect("store lock poisoned");
        Ok(files.contains_key(&Self::key(scope, folder, name)))
    }

    async fn read_file(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<Vec<u8>> {
        let files = self.files.lock().expect("store lock poisoned");
        files
            .get(&Self::key(scope, folder, name))
            .cloned()
            .ok_or_else(|| ShelfError::StoreFileNotFound {
                scope: scope.to_string(),
                folder: folder.to_string(),
                name: name.to_string(),
            })
    }

    async fn upsert_file(
        &self,
        scope: &Scope,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> ShelfResult<()> {
        let mut files = self.files.lock().expect("store lock poisoned");
        files.insert(Self::key(scope, folder, name), content.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_file(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<()> {
        let mut files = self.files.lock().expect("store lock poisoned");
        files.remove(&Self::key(scope, folder, name));
        Ok(())
    }
}
