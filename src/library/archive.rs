//! Dependency archive packing
//!
//! On every successful npm execution the bot's `node_modules` tree is
//! packed wholesale into `node_modules.tgz`, so a later database sync
//! always finds a current snapshot. Archives are replaced, never patched.

use crate::error::{ShelfError, ShelfResult};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pack a directory into a gzip'd tar archive at `dest`.
///
/// A missing source directory produces an empty archive rather than an
/// error (nothing installed yet is a valid state). Runs on a blocking
/// thread; dependency trees can be large.
pub async fn pack_directory(src: PathBuf, dest: PathBuf) -> ShelfResult<()> {
    tokio::task::spawn_blocking(move || pack_blocking(&src, &dest))
        .await
        .map_err(|e| ShelfError::Internal(format!("archive task failed: {e}")))?
}

fn pack_blocking(src: &Path, dest: &Path) -> ShelfResult<()> {
    let file = File::create(dest).map_err(|e| ShelfError::ArchivePack {
        path: dest.to_path_buf(),
        reason: e.to_string(),
    })?;

    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    if src.is_dir() {
        builder
            .append_dir_all("", src)
            .map_err(|e| ShelfError::ArchivePack {
                path: dest.to_path_buf(),
                reason: e.to_string(),
            })?;
    }

    let encoder = builder.into_inner().map_err(|e| ShelfError::ArchivePack {
        path: dest.to_path_buf(),
        reason: e.to_string(),
    })?;
    encoder.finish().map_err(|e| ShelfError::ArchivePack {
        path: dest.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(dest = %dest.display(), "Packed dependency archive");
    Ok(())
}
