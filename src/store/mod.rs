//! Virtual bot store abstraction
//!
//! The store holds each bot's persisted files under a namespaced scope,
//! plus a `global` scope shared by all bots. Backends are interchangeable:
//! [`DiskStore`] passes through to the local data tree, [`MemoryStore`]
//! stands in for an external database engine.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::error::ShelfResult;
use async_trait::async_trait;
use std::fmt;

/// Namespace a store operation is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A single bot's namespace
    Bot(String),
    /// The shared global namespace
    Global,
}

impl Scope {
    /// Create a bot scope
    pub fn bot(bot_id: impl Into<String>) -> Self {
        Self::Bot(bot_id.into())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bot(id) => write!(f, "bots/{id}"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// Abstract virtual bot store interface
///
/// All operations take a `(folder, name)` pair relative to the scope,
/// mirroring the on-disk layout `<scope>/<folder>/<name>`.
#[async_trait]
pub trait BotStore: Send + Sync {
    /// Check whether a file exists
    async fn file_exists(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<bool>;

    /// Read a file's full content
    async fn read_file(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<Vec<u8>>;

    /// Create or replace a file
    async fn upsert_file(
        &self,
        scope: &Scope,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> ShelfResult<()>;

    /// Delete a file. Deleting a missing file is not an error.
    async fn delete_file(&self, scope: &Scope, folder: &str, name: &str) -> ShelfResult<()>;
}

/// Fluent handle binding a store to one scope
///
/// `store.bot("b1").file_exists("libraries", "package.json")` reads the
/// way call sites think about the store.
pub struct ScopedStore<'a, T: BotStore + ?Sized = dyn BotStore> {
    store: &'a T,
    scope: Scope,
}

impl<'a, T: BotStore + ?Sized> ScopedStore<'a, T> {
    pub async fn file_exists(&self, folder: &str, name: &str) -> ShelfResult<bool> {
        self.store.file_exists(&self.scope, folder, name).await
    }

    pub async fn read_file(&self, folder: &str, name: &str) -> ShelfResult<Vec<u8>> {
        self.store.read_file(&self.scope, folder, name).await
    }

    pub async fn upsert_file(&self, folder: &str, name: &str, content: &[u8]) -> ShelfResult<()> {
        self.store
            .upsert_file(&self.scope, folder, name, content)
            .await
    }

    pub async fn delete_file(&self, folder: &str, name: &str) -> ShelfResult<()> {
        self.store.delete_file(&self.scope, folder, name).await
    }
}

/// Scoping helpers available on any store
pub trait BotStoreExt: BotStore {
    /// Scope to a single bot's namespace
    fn bot(&self, bot_id: &str) -> ScopedStore<'_, Self>;

    /// Scope to the shared global namespace
    fn global_scope(&self) -> ScopedStore<'_, Self>;
}

impl<T: BotStore + ?Sized> BotStoreExt for T {
    fn bot(&self, bot_id: &str) -> ScopedStore<'_, Self> {
        ScopedStore {
            store: self,
            scope: Scope::bot(bot_id),
        }
    }

    fn global_scope(&self) -> ScopedStore<'_, Self> {
        ScopedStore {
            store: self,
            scope: Scope::Global,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_display() {
        assert_eq!(Scope::bot("b1").to_string(), "bots/b1");
        assert_eq!(Scope::Global.to_string(), "global");
    }
}
