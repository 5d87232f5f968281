//! Library synchronization & execution engine
//!
//! Owns the lifecycle of a bot's dependency environment: the manifest,
//! the local `node_modules` materialization, the npm subprocess that
//! mutates it, and propagation of the results into the virtual bot store.
//!
//! All mutations for one bot go through a per-bot lock; the dependency
//! directory and manifest are a single shared resource and concurrent npm
//! runs against them would corrupt both.

pub mod archive;
pub mod example;
pub mod manifest;

pub use manifest::LibraryManifest;

use crate::config::{Config, StorageMode};
use crate::error::{ShelfError, ShelfResult};
use crate::store::{BotStore, BotStoreExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::{mpsc, Mutex, OnceCell};
use tracing::{debug, error, info, warn};

/// Store folder holding a bot's library files
const LIB_FOLDER: &str = "libraries";
/// Dependency manifest file name
const MANIFEST_FILE: &str = "package.json";
/// npm lockfile name
const LOCKFILE: &str = "package-lock.json";
/// Packed dependency archive name
const ARCHIVE_FILE: &str = "node_modules.tgz";
/// Installed dependency tree directory
const NODE_MODULES: &str = "node_modules";
/// Substring marking an npm-level error in the combined output
const ERROR_MARKER: &str = "ERR!";

#[cfg(windows)]
const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_SEPARATOR: &str = ":";

/// Strip characters npm arguments may not carry.
///
/// Arguments can originate from user-supplied package names, so anything
/// outside the allow-list (letters, digits, `/ _ . @ ^ - ( )` and space)
/// is dropped, then the first doubled path separator is collapsed.
pub fn sanitize_arg(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "/_.@^-() ".contains(*c))
        .collect();
    filtered.replacen("//", "/", 1)
}

/// Append the fixed npm flags and sanitize every argument.
///
/// `--no-fund` hides superfluous messages; `--scripts-prepend-node-path`
/// lets post-install scripts find a runtime when running from the
/// packaged binary.
pub fn prepare_args(args: &[String]) -> Vec<String> {
    let mut args: Vec<String> = args.to_vec();
    args.push("--no-fund".to_string());
    args.push("--scripts-prepend-node-path".to_string());
    args.iter().map(|a| sanitize_arg(a)).collect()
}

/// Per-bot library manager
pub struct LibraryManager {
    config: Arc<Config>,
    store: Arc<dyn BotStore>,
    /// Resolved npm implementation directory, memoized per process
    npm_dir: OnceCell<PathBuf>,
    /// Per-bot execution locks; npm runs for one bot never interleave
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LibraryManager {
    pub fn new(config: Arc<Config>, store: Arc<dyn BotStore>) -> Self {
        Self {
            config,
            store,
            npm_dir: OnceCell::new(),
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// True iff the bot's manifest exists in the store. Pure read.
    pub async fn is_initialized(&self, bot_id: &str) -> ShelfResult<bool> {
        self.store
            .bot(bot_id)
            .file_exists(LIB_FOLDER, MANIFEST_FILE)
            .await
    }

    /// Synthesize and store a default manifest if the bot has none.
    /// Idempotent: a second call performs no writes.
    pub async fn create_default_package(&self, bot_id: &str) -> ShelfResult<()> {
        if self.is_initialized(bot_id).await? {
            return Ok(());
        }

        let manifest = LibraryManifest::default();
        self.store
            .bot(bot_id)
            .upsert_file(LIB_FOLDER, MANIFEST_FILE, &manifest.to_json()?)
            .await
    }

    /// Ensure the bot's library environment is usable.
    ///
    /// In database mode the manifest and lockfile are copied down to local
    /// disk so npm has files to operate on; in disk mode the store already
    /// is the local disk.
    pub async fn initialize(&self, bot_id: &str) -> ShelfResult<()> {
        self.create_default_package(bot_id).await?;

        if self.config.storage == StorageMode::Database {
            self.copy_file_locally(bot_id, MANIFEST_FILE).await;
            self.copy_file_locally(bot_id, LOCKFILE).await;
        }

        Ok(())
    }

    /// Run npm for a bot and propagate the results.
    ///
    /// The working directory is the bot's library directory unless
    /// `custom_dir` overrides it. Output is classified by scanning for the
    /// npm error marker; on success the manifest, lockfile, and a freshly
    /// packed dependency archive are pushed into the store (skipped in
    /// disk mode). Returns the combined stdout/stderr output.
    pub async fn execute_npm(
        &self,
        bot_id: &str,
        args: &[String],
        custom_dir: Option<&Path>,
    ) -> ShelfResult<String> {
        let lock = self.bot_lock(bot_id);
        let _guard = lock.lock().await;
        self.execute_npm_locked(bot_id, args, custom_dir).await
    }

    async fn execute_npm_locked(
        &self,
        bot_id: &str,
        args: &[String],
        custom_dir: Option<&Path>,
    ) -> ShelfResult<String> {
        let npm_dir = self.npm_dir().await?;
        let cli_path = npm_dir.join("bin").join("npm-cli.js");

        let clean_args = prepare_args(args);
        let cwd = custom_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.bot_libraries_dir(bot_id));

        fs::create_dir_all(&cwd)
            .await
            .map_err(|e| ShelfError::io(format!("creating library directory {}", cwd.display()), e))?;

        // npm runs under our own executable, not a system-wide node: the
        // packaged binary embeds the runtime and signals it via env.
        let exe = std::env::current_exe()
            .map_err(|e| ShelfError::io("resolving current executable", e))?;
        let exe_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let path_var = std::env::var("PATH").unwrap_or_default();

        debug!(
            exec = %exe.display(),
            cwd = %cwd.display(),
            args = ?clean_args,
            "Executing npm"
        );

        let mut child = Command::new(&exe)
            .arg(&cli_path)
            .args(&clean_args)
            .current_dir(&cwd)
            .env(
                "PATH",
                format!("{path_var}{PATH_SEPARATOR}{}", exe_dir.display()),
            )
            .env("PKG_EXECPATH", "PKG_INVOKE_NODEJS")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ShelfError::spawn(format!("npm {}", clean_args.join(" ")), e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ShelfError::Internal("child stdout not piped".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ShelfError::Internal("child stderr not piped".to_string()))?;

        // Single channel keeps stdout and stderr chunks in arrival order.
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let out_task = drain_into(stdout, tx.clone());
        let err_task = drain_into(stderr, tx);

        // Await actual process exit, then the fully drained buffers.
        let status = child
            .wait()
            .await
            .map_err(|e| ShelfError::io("waiting for npm to exit", e))?;
        let _ = out_task.await;
        let _ = err_task.await;

        let mut output = String::new();
        while let Ok(chunk) = rx.try_recv() {
            output.push_str(&chunk);
        }

        if output.contains(ERROR_MARKER) {
            warn!(code = ?status.code(), "npm reported errors");
            return Err(ShelfError::NpmFailed { output });
        }

        self.publish_package_changes(bot_id).await?;
        info!("Command executed successfully: {output}");
        Ok(output)
    }

    /// Pack the dependency tree and push changed artifacts to the store.
    ///
    /// The archive is regenerated even in disk mode so a later database
    /// sync always finds a current snapshot; the store writes themselves
    /// are skipped when the disk is already authoritative.
    pub async fn publish_package_changes(&self, bot_id: &str) -> ShelfResult<()> {
        let node_modules = self.config.bot_library_file(bot_id, NODE_MODULES);
        let archive_path = self.config.bot_library_file(bot_id, ARCHIVE_FILE);
        archive::pack_directory(node_modules, archive_path.clone()).await?;

        if self.config.storage == StorageMode::Disk {
            return Ok(());
        }

        let scoped = self.store.bot(bot_id);
        for name in [MANIFEST_FILE, LOCKFILE] {
            let path = self.config.bot_library_file(bot_id, name);
            let content = fs::read(&path)
                .await
                .map_err(|e| ShelfError::io(format!("reading {}", path.display()), e))?;
            scoped.upsert_file(LIB_FOLDER, name, &content).await?;
        }

        let archive_bytes = fs::read(&archive_path)
            .await
            .map_err(|e| ShelfError::io(format!("reading {}", archive_path.display()), e))?;
        scoped
            .upsert_file(LIB_FOLDER, ARCHIVE_FILE, &archive_bytes)
            .await?;

        debug!(bot_id, "Published package changes to store");
        Ok(())
    }

    /// Remove a dependency and reconcile the tree.
    ///
    /// Returns `Ok(false)` when the dependency is absent or the manifest
    /// is unreadable (logged); performs no writes in either case.
    pub async fn remove_library(&self, bot_id: &str, name: &str) -> ShelfResult<bool> {
        let lock = self.bot_lock(bot_id);
        let _guard = lock.lock().await;

        let manifest_path = self.config.bot_library_file(bot_id, MANIFEST_FILE);
        let mut manifest = match LibraryManifest::from_file(&manifest_path).await {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Couldn't read package manifest");
                return Ok(false);
            }
        };

        let Some(source) = manifest.dependency_source(name).map(str::to_string) else {
            return Ok(false);
        };

        if manifest::is_archive_source(&source) {
            self.delete_library_archive(bot_id, manifest::archive_file_name(&source))
                .await;
        }

        manifest.remove_dependency(name);
        manifest.write_to(&manifest_path).await?;

        // Full reinstall regenerates node_modules and the archive.
        self.execute_npm_locked(bot_id, &["install".to_string()], None)
            .await?;

        Ok(true)
    }

    /// Best-effort removal of a packed archive from store and local disk.
    /// Absence is not an error; failures are logged, never propagated.
    pub(crate) async fn delete_library_archive(&self, bot_id: &str, file_name: &str) {
        if let Err(e) = self
            .store
            .bot(bot_id)
            .delete_file(LIB_FOLDER, file_name)
            .await
        {
            warn!(error = %e, "Error while deleting the library archive");
        }

        let local = self.config.bot_library_file(bot_id, file_name);
        if local.exists() {
            if let Err(e) = fs::remove_file(&local).await {
                warn!(error = %e, "Error while deleting the local archive");
            }
        }
    }

    /// Seed the global example library. Idempotent by overwrite.
    pub async fn create_default_example(&self) -> ShelfResult<()> {
        self.store
            .global_scope()
            .upsert_file(LIB_FOLDER, "example.js", example::EXAMPLE_JS.as_bytes())
            .await
    }

    /// Ensure a `node` alias exists next to the packaged binary so npm's
    /// shebang scripts can locate a runtime. No-op when not packaged or
    /// when the alias already exists. Callers treat a failure here as
    /// non-fatal; the alias only matters for post-install scripts.
    pub async fn create_node_symlink(&self) -> ShelfResult<()> {
        if !self.config.packaged {
            return Ok(());
        }

        let exe = std::env::current_exe()
            .map_err(|e| ShelfError::io("resolving current executable", e))?;
        let dir = exe
            .parent()
            .ok_or_else(|| ShelfError::Internal("executable has no parent directory".to_string()))?
            .to_path_buf();

        node_symlink_at(&exe, &dir).await
    }

    /// Copy a library file from the store to the bot's local directory.
    ///
    /// Best-effort: `false` when the source is missing or any step fails
    /// (logged). Callers treat the local copy as an optimization only.
    pub async fn copy_file_locally(&self, bot_id: &str, file_name: &str) -> bool {
        let scoped = self.store.bot(bot_id);

        match scoped.file_exists(LIB_FOLDER, file_name).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                error!(error = %e, "Couldn't check store for {file_name}");
                return false;
            }
        }

        let content = match scoped.read_file(LIB_FOLDER, file_name).await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Couldn't copy locally");
                return false;
            }
        };

        let dest = self.config.bot_library_file(bot_id, file_name);
        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                error!(error = %e, "Couldn't copy locally");
                return false;
            }
        }

        if let Err(e) = fs::write(&dest, content).await {
            error!(error = %e, "Couldn't copy locally");
            return false;
        }

        true
    }

    /// Resolve the npm implementation directory, memoized per process.
    ///
    /// Development builds use `node_modules/npm` under the working
    /// directory; the packaged binary extracts its bundled copy into the
    /// app data directory once and reuses it afterwards.
    async fn npm_dir(&self) -> ShelfResult<&PathBuf> {
        self.npm_dir
            .get_or_try_init(|| async { self.resolve_npm_dir().await })
            .await
    }

    async fn resolve_npm_dir(&self) -> ShelfResult<PathBuf> {
        if !self.config.packaged {
            let cwd = std::env::current_dir()
                .map_err(|e| ShelfError::io("resolving working directory", e))?;
            return Ok(cwd.join(NODE_MODULES).join("npm"));
        }

        let app_npm = self.config.app_data_dir.join("npm");
        if app_npm.exists() {
            return Ok(app_npm);
        }

        let exe = std::env::current_exe()
            .map_err(|e| ShelfError::io("resolving current executable", e))?;
        let bundled = exe
            .parent()
            .ok_or_else(|| ShelfError::Internal("executable has no parent directory".to_string()))?
            .join(NODE_MODULES)
            .join("npm");

        if !bundled.exists() {
            return Err(ShelfError::NpmNotFound(bundled));
        }

        copy_dir_recursive(bundled.clone(), app_npm.clone()).await?;
        debug!(from = %bundled.display(), to = %app_npm.display(), "Extracted npm");
        Ok(app_npm)
    }

    fn bot_lock(&self, bot_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock table poisoned");
        locks.entry(bot_id.to_string()).or_default().clone()
    }
}

/// Create a `node` alias in `dir` pointing at `exe`, if absent
pub(crate) async fn node_symlink_at(exe: &Path, dir: &Path) -> ShelfResult<()> {
    let node_path = dir.join("node");
    if node_path.exists() {
        return Ok(());
    }

    #[cfg(unix)]
    let result = fs::symlink(exe, &node_path).await;
    #[cfg(windows)]
    let result = fs::symlink_file(exe, &node_path).await;

    result.map_err(|e| {
        error!(path = %node_path.display(), error = %e, "Failed to create node symlink");
        ShelfError::io("creating node symlink", e)
    })
}

/// Forward every output chunk into the shared collector channel
fn drain_into(
    mut reader: impl AsyncReadExt + Unpin + Send + 'static,
    tx: mpsc::UnboundedSender<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
                }
            }
        }
    })
}

/// Recursive directory copy on a blocking thread (npm trees are large)
async fn copy_dir_recursive(from: PathBuf, to: PathBuf) -> ShelfResult<()> {
    tokio::task::spawn_blocking(move || copy_dir_blocking(&from, &to))
        .await
        .map_err(|e| ShelfError::Internal(format!("copy task failed: {e}")))?
}

fn copy_dir_blocking(from: &Path, to: &Path) -> ShelfResult<()> {
    std::fs::create_dir_all(to).map_err(|e| ShelfError::NpmExtract {
        path: to.to_path_buf(),
        reason: e.to_string(),
    })?;

    let entries = std::fs::read_dir(from).map_err(|e| ShelfError::NpmExtract {
        path: from.to_path_buf(),
        reason: e.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ShelfError::NpmExtract {
            path: from.to_path_buf(),
            reason: e.to_string(),
        })?;
        let dest = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| ShelfError::NpmExtract {
            path: entry.path(),
            reason: e.to_string(),
        })?;

        if file_type.is_dir() {
            copy_dir_blocking(&entry.path(), &dest)?;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), &dest).map_err(|e| ShelfError::NpmExtract {
                path: entry.path(),
                reason: e.to_string(),
            })?;
        }
        // Symlinks inside the npm tree are skipped; npm ships none that
        // matter for running the CLI.
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    fn manager_with(temp: &TempDir, storage: StorageMode) -> (LibraryManager, Arc<MemoryStore>) {
        let config = Arc::new(Config {
            data_dir: temp.path().to_path_buf(),
            storage,
            ..Config::default()
        });
        let store = Arc::new(MemoryStore::new());
        (
            LibraryManager::new(config, Arc::clone(&store) as Arc<dyn BotStore>),
            store,
        )
    }

    #[test]
    fn sanitize_strips_shell_metacharacters() {
        assert_eq!(
            sanitize_arg("lodash@^4.17.0; rm -rf"),
            "lodash@^4.17.0 rm -rf"
        );
        assert_eq!(sanitize_arg("a|b&c$d`e\"f'g"), "abcdefg");
    }

    #[test]
    fn sanitize_keeps_valid_specifiers() {
        assert_eq!(sanitize_arg("left-pad@^1.3.0"), "left-pad@^1.3.0");
        assert_eq!(sanitize_arg("file:pkg (copy).tgz"), "file:pkg (copy).tgz");
        assert_eq!(sanitize_arg("@scope/name"), "@scope/name");
    }

    #[test]
    fn sanitize_collapses_first_doubled_slash() {
        assert_eq!(sanitize_arg("a//b"), "a/b");
        // Only the first occurrence is collapsed.
        assert_eq!(sanitize_arg("a//b//c"), "a/b//c");
    }

    #[test]
    fn prepare_args_appends_fixed_flags() {
        let args = prepare_args(&["install".to_string(), "left;pad".to_string()]);
        assert_eq!(
            args,
            vec!["install", "leftpad", "--no-fund", "--scripts-prepend-node-path"]
        );
    }

    #[tokio::test]
    async fn create_default_package_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Database);

        assert!(!manager.is_initialized("b1").await.unwrap());
        manager.create_default_package("b1").await.unwrap();
        assert!(manager.is_initialized("b1").await.unwrap());
        assert_eq!(store.write_count(), 1);

        manager.create_default_package("b1").await.unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn default_package_has_expected_shape() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Database);

        manager.create_default_package("b1").await.unwrap();

        let content = store.bot("b1").read_file(LIB_FOLDER, MANIFEST_FILE).await.unwrap();
        let manifest = LibraryManifest::parse(&content).unwrap();
        assert_eq!(manifest.name, "shared_libs");
        assert!(manifest.dependencies.is_empty());
    }

    #[tokio::test]
    async fn initialize_copies_files_locally_in_database_mode() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Database);

        store
            .bot("b1")
            .upsert_file(LIB_FOLDER, LOCKFILE, b"{\"lockfileVersion\": 2}")
            .await
            .unwrap();

        manager.initialize("b1").await.unwrap();

        assert!(temp.path().join("bots/b1/libraries/package.json").is_file());
        assert!(temp
            .path()
            .join("bots/b1/libraries/package-lock.json")
            .is_file());
    }

    #[tokio::test]
    async fn initialize_skips_local_copy_in_disk_mode() {
        let temp = TempDir::new().unwrap();
        let (manager, _store) = manager_with(&temp, StorageMode::Disk);

        manager.initialize("b1").await.unwrap();

        // MemoryStore received the manifest; nothing was copied down.
        assert!(!temp.path().join("bots/b1/libraries/package.json").exists());
    }

    #[tokio::test]
    async fn copy_file_locally_missing_source_is_false() {
        let temp = TempDir::new().unwrap();
        let (manager, _store) = manager_with(&temp, StorageMode::Database);

        assert!(!manager.copy_file_locally("b1", "package.json").await);
    }

    #[tokio::test]
    async fn remove_library_absent_dependency_is_noop() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Database);

        let libs = temp.path().join("bots/b1/libraries");
        std::fs::create_dir_all(&libs).unwrap();
        let manifest = LibraryManifest::default();
        std::fs::write(libs.join("package.json"), manifest.to_json().unwrap()).unwrap();

        let removed = manager.remove_library("b1", "left-pad").await.unwrap();
        assert!(!removed);
        assert_eq!(store.write_count(), 0);

        // Manifest untouched on disk.
        let on_disk = LibraryManifest::parse(&std::fs::read(libs.join("package.json")).unwrap())
            .unwrap();
        assert!(on_disk.dependencies.is_empty());
    }

    #[tokio::test]
    async fn remove_library_unreadable_manifest_is_false() {
        let temp = TempDir::new().unwrap();
        let (manager, _store) = manager_with(&temp, StorageMode::Database);

        let libs = temp.path().join("bots/b1/libraries");
        std::fs::create_dir_all(&libs).unwrap();
        std::fs::write(libs.join("package.json"), b"not json").unwrap();

        let removed = manager.remove_library("b1", "left-pad").await.unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn delete_library_archive_removes_both_copies() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Database);

        store
            .bot("b1")
            .upsert_file(LIB_FOLDER, "pkg.tgz", b"archive")
            .await
            .unwrap();
        let libs = temp.path().join("bots/b1/libraries");
        std::fs::create_dir_all(&libs).unwrap();
        std::fs::write(libs.join("pkg.tgz"), b"archive").unwrap();

        manager.delete_library_archive("b1", "pkg.tgz").await;

        assert!(!store.bot("b1").file_exists(LIB_FOLDER, "pkg.tgz").await.unwrap());
        assert!(!libs.join("pkg.tgz").exists());
    }

    #[tokio::test]
    async fn delete_library_archive_tolerates_absence() {
        let temp = TempDir::new().unwrap();
        let (manager, _store) = manager_with(&temp, StorageMode::Database);

        manager.delete_library_archive("b1", "missing.tgz").await;
    }

    #[tokio::test]
    async fn create_default_example_seeds_global_scope() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Database);

        manager.create_default_example().await.unwrap();
        manager.create_default_example().await.unwrap();

        let content = store
            .global_scope()
            .read_file(LIB_FOLDER, "example.js")
            .await
            .unwrap();
        assert!(String::from_utf8(content).unwrap().contains("module.exports"));
    }

    #[tokio::test]
    async fn node_symlink_is_noop_when_not_packaged() {
        let temp = TempDir::new().unwrap();
        let (manager, _store) = manager_with(&temp, StorageMode::Disk);

        manager.create_node_symlink().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn node_symlink_created_once() {
        let temp = TempDir::new().unwrap();
        let exe = temp.path().join("shelf-bin");
        std::fs::write(&exe, b"").unwrap();

        node_symlink_at(&exe, temp.path()).await.unwrap();
        assert!(temp.path().join("node").is_symlink());

        // Existing alias is left alone.
        node_symlink_at(&exe, temp.path()).await.unwrap();
    }

    #[tokio::test]
    async fn node_symlink_failure_surfaces_as_error() {
        let temp = TempDir::new().unwrap();
        let exe = temp.path().join("shelf-bin");
        std::fs::write(&exe, b"").unwrap();

        let err = node_symlink_at(&exe, &temp.path().join("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::Io { .. }));
    }

    #[tokio::test]
    async fn bot_locks_serialize_per_bot_only() {
        let temp = TempDir::new().unwrap();
        let (manager, _store) = manager_with(&temp, StorageMode::Disk);

        let b1 = manager.bot_lock("b1");
        let b1_again = manager.bot_lock("b1");
        let b2 = manager.bot_lock("b2");

        let guard = b1.lock().await;
        // Same bot: second acquisition must wait.
        assert!(b1_again.try_lock().is_err());
        // Different bot: independent.
        assert!(b2.try_lock().is_ok());
        drop(guard);
        assert!(b1_again.try_lock().is_ok());
    }

    #[tokio::test]
    async fn publish_skips_store_in_disk_mode() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Disk);

        let libs = temp.path().join("bots/b1/libraries");
        std::fs::create_dir_all(libs.join("node_modules/left-pad")).unwrap();
        std::fs::write(libs.join("node_modules/left-pad/index.js"), b"x").unwrap();

        manager.publish_package_changes("b1").await.unwrap();

        // Archive regenerated locally, but nothing pushed to the store.
        assert!(libs.join("node_modules.tgz").is_file());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn publish_pushes_artifacts_in_database_mode() {
        let temp = TempDir::new().unwrap();
        let (manager, store) = manager_with(&temp, StorageMode::Database);

        let libs = temp.path().join("bots/b1/libraries");
        std::fs::create_dir_all(libs.join("node_modules")).unwrap();
        std::fs::write(
            libs.join("package.json"),
            LibraryManifest::default().to_json().unwrap(),
        )
        .unwrap();
        std::fs::write(libs.join("package-lock.json"), b"{}").unwrap();

        manager.publish_package_changes("b1").await.unwrap();

        let scoped = store.bot("b1");
        assert!(scoped.file_exists(LIB_FOLDER, MANIFEST_FILE).await.unwrap());
        assert!(scoped.file_exists(LIB_FOLDER, LOCKFILE).await.unwrap());
        assert!(scoped.file_exists(LIB_FOLDER, ARCHIVE_FILE).await.unwrap());
    }

    #[tokio::test]
    async fn publish_propagation_failure_surfaces() {
        let temp = TempDir::new().unwrap();
        let (manager, _store) = manager_with(&temp, StorageMode::Database);

        // node_modules absent is fine (empty archive), but the manifest
        // missing from local disk is a propagation error.
        std::fs::create_dir_all(temp.path().join("bots/b1/libraries")).unwrap();
        let err = manager.publish_package_changes("b1").await.unwrap_err();
        assert!(matches!(err, ShelfError::Io { .. }));
    }
}
