//! Persistence for [`LocalSyncState`] (`sync.json`).

use crate::error::SyncResult;
use crate::fs::PluginFs;
use crate::layout::HostLayout;
use crate::types::LocalSyncState;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads and writes the local sync record.
///
/// Loading never fails on bad content: a corrupt file or field falls back
/// to defaults. Saving replaces the whole file in one write.
pub struct LocalStateStore {
    fs: Arc<dyn PluginFs>,
    dir: String,
    path: String,
}

impl LocalStateStore {
    pub fn new(fs: Arc<dyn PluginFs>, layout: &HostLayout) -> Self {
        Self {
            fs,
            dir: layout.data_dir(),
            path: layout.local_state_path(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Loads the stored state, or the default if there is none.
    ///
    /// Only I/O errors other than a missing file are returned.
    pub async fn load(&self) -> SyncResult<LocalSyncState> {
        if !self.fs.exists(&self.path).await? {
            debug!("no local sync state at {}", self.path);
            return Ok(LocalSyncState::default());
        }

        let text = self.fs.read(&self.path).await?;
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => Ok(LocalSyncState::from_value_lenient(&value)),
            Err(e) => {
                warn!("ignoring malformed {}: {e}", self.path);
                Ok(LocalSyncState::default())
            }
        }
    }

    pub async fn save(&self, state: &LocalSyncState) -> SyncResult<()> {
        if !self.fs.exists(&self.dir).await? {
            self.fs.mkdir(&self.dir).await?;
        }

        let json = serde_json::to_string_pretty(state)?;
        self.fs.write(&self.path, &json).await
    }
}
