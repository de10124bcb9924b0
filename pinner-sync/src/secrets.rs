//! Name-keyed secret storage shared across vaults.
//!
//! Secrets live in a JSON object on disk, outside any vault, so tokens are
//! never synced along with settings.

use crate::error::{SyncError, SyncResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SECRETS_FILE: &str = "secrets.json";

/// Stores secrets such as the GitHub token by name.
#[derive(Clone, Debug)]
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform's per-user config directory.
    pub fn open_default() -> Self {
        Self::new(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plugins-pinner")
            .join(SECRETS_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the secret, or `None` if it is unset or empty.
    pub fn get(&self, name: &str) -> SyncResult<Option<String>> {
        let secrets = self.load()?;
        Ok(secrets.get(name).filter(|v| !v.is_empty()).cloned())
    }

    pub fn set(&self, name: &str, value: &str) -> SyncResult<()> {
        let mut secrets = self.load()?;
        secrets.insert(name.to_string(), value.to_string());
        self.save(&secrets)?;
        info!("stored secret {name}");
        Ok(())
    }

    /// Removes the secret. Returns whether it existed.
    pub fn remove(&self, name: &str) -> SyncResult<bool> {
        let mut secrets = self.load()?;
        let existed = secrets.remove(name).is_some();
        if existed {
            self.save(&secrets)?;
            info!("removed secret {name}");
        }
        Ok(existed)
    }

    fn load(&self) -> SyncResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| SyncError::fs(self.path.display().to_string(), e))?;
        serde_json::from_str(&json)
            .map_err(|e| SyncError::Secret(format!("{} is not a secrets file: {e}", self.path.display())))
    }

    fn save(&self, secrets: &BTreeMap<String, String>) -> SyncResult<()> {
        let shown = self.path.display().to_string();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::fs(&shown, e))?;
        }

        let json = serde_json::to_string_pretty(secrets)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| SyncError::fs(&shown, e))?;

        // Owner read/write only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| SyncError::fs(&shown, e))?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| SyncError::fs(&shown, e))?;
        debug!("saved secrets to {}", self.path.display());
        Ok(())
    }
}
