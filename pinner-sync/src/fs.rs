//! Filesystem adapter for the host's plugin namespace.
//!
//! Paths are `/`-separated and relative to the host root (for a vault:
//! `.obsidian/plugins/<id>/main.js`). The adapter is the only way the
//! installer, scanner and stores touch disk.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Entries directly under a directory, as full virtual paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirListing {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

/// Host filesystem operations used by the sync engine.
#[async_trait]
pub trait PluginFs: Send + Sync {
    async fn exists(&self, path: &str) -> SyncResult<bool>;

    /// Creates a directory and any missing parents. Succeeds if it already exists.
    async fn mkdir(&self, path: &str) -> SyncResult<()>;

    async fn read(&self, path: &str) -> SyncResult<String>;

    /// Replaces the file's contents in one step.
    async fn write(&self, path: &str, data: &str) -> SyncResult<()>;

    async fn write_binary(&self, path: &str, data: &[u8]) -> SyncResult<()>;

    async fn list(&self, path: &str) -> SyncResult<DirListing>;
}

/// [`PluginFs`] backed by a directory on the local disk.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader never sees a half-written file.
#[derive(Clone, Debug)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a virtual path onto the root, refusing to leave it.
    pub fn resolve(&self, path: &str) -> SyncResult<PathBuf> {
        let mut resolved = self.root.clone();
        for component in path.split('/') {
            match component {
                "" | "." => continue,
                ".." => return Err(SyncError::InvalidPath(path.to_string())),
                c if c.contains('\\') => return Err(SyncError::InvalidPath(path.to_string())),
                c => resolved.push(c),
            }
        }
        Ok(resolved)
    }

    async fn write_atomic(&self, path: &str, data: &[u8]) -> SyncResult<()> {
        let target = self.resolve(path)?;
        let file_name = target
            .file_name()
            .ok_or_else(|| SyncError::InvalidPath(path.to_string()))?;

        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".pinner-tmp");
        let tmp = target.with_file_name(tmp_name);

        if let Err(e) = tokio::fs::write(&tmp, data).await {
            return Err(SyncError::fs(path, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SyncError::fs(path, e));
        }

        debug!("wrote {} bytes to {path}", data.len());
        Ok(())
    }
}

#[async_trait]
impl PluginFs for LocalFs {
    async fn exists(&self, path: &str) -> SyncResult<bool> {
        let resolved = self.resolve(path)?;
        tokio::fs::try_exists(&resolved)
            .await
            .map_err(|e| SyncError::fs(path, e))
    }

    async fn mkdir(&self, path: &str) -> SyncResult<()> {
        let resolved = self.resolve(path)?;
        tokio::fs::create_dir_all(&resolved)
            .await
            .map_err(|e| SyncError::fs(path, e))
    }

    async fn read(&self, path: &str) -> SyncResult<String> {
        let resolved = self.resolve(path)?;
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| SyncError::fs(path, e))
    }

    async fn write(&self, path: &str, data: &str) -> SyncResult<()> {
        self.write_atomic(path, data.as_bytes()).await
    }

    async fn write_binary(&self, path: &str, data: &[u8]) -> SyncResult<()> {
        self.write_atomic(path, data).await
    }

    async fn list(&self, path: &str) -> SyncResult<DirListing> {
        let resolved = self.resolve(path)?;
        let mut entries = tokio::fs::read_dir(&resolved)
            .await
            .map_err(|e| SyncError::fs(path, e))?;

        let base = path.trim_end_matches('/');
        let mut listing = DirListing::default();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SyncError::fs(path, e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let child = if base.is_empty() {
                name
            } else {
                format!("{base}/{name}")
            };

            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SyncError::fs(&child, e))?;
            if file_type.is_dir() {
                listing.folders.push(child);
            } else {
                listing.files.push(child);
            }
        }

        listing.files.sort();
        listing.folders.sort();
        Ok(listing)
    }
}
