//! Pinner settings (`data.json`) and the edit operations behind the
//! settings commands.

use crate::error::{SyncError, SyncResult};
use crate::fs::PluginFs;
use crate::layout::HostLayout;
use crate::types::{field_or, TrackedPluginEntry};
use pinner_github::RepoRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_SETTINGS_VERSION: &str = "0.0.0";
pub const DEFAULT_TOKEN_SECRET_NAME: &str = "github-token";

/// User settings: the desired-state list and behaviour flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnerSettings {
    pub version: String,
    pub plugins: Vec<TrackedPluginEntry>,
    /// Run a sync after the startup scan.
    pub auto_sync_on_load: bool,
    /// Report automatic sync results.
    pub show_sync_notification: bool,
    /// Name of the secret holding the GitHub token.
    pub github_token_secret_name: String,
}

impl Default for PinnerSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_SETTINGS_VERSION.to_string(),
            plugins: Vec::new(),
            auto_sync_on_load: true,
            show_sync_notification: true,
            github_token_secret_name: DEFAULT_TOKEN_SECRET_NAME.to_string(),
        }
    }
}

impl PinnerSettings {
    /// Builds settings from arbitrary JSON. Each missing or malformed field
    /// falls back to its default; unknown fields are dropped.
    pub fn from_value_lenient(value: &serde_json::Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = value.as_object() else {
            return defaults;
        };

        Self {
            version: field_or(obj, "version", || defaults.version.clone()),
            plugins: field_or(obj, "plugins", Vec::new),
            auto_sync_on_load: field_or(obj, "autoSyncOnLoad", || defaults.auto_sync_on_load),
            show_sync_notification: field_or(obj, "showSyncNotification", || {
                defaults.show_sync_notification
            }),
            github_token_secret_name: field_or(obj, "githubTokenSecretName", || {
                defaults.github_token_secret_name.clone()
            }),
        }
    }

    /// Entries that have a url configured.
    pub fn plugins_with_urls(&self) -> impl Iterator<Item = &TrackedPluginEntry> {
        self.plugins.iter().filter(|p| !p.url.trim().is_empty())
    }

    // ── Edits ──

    /// Starts tracking `url` at `version`. The entry is enabled and has no
    /// id until a scan or install resolves it.
    pub fn add_plugin(&mut self, url: &str, version: &str) -> SyncResult<&TrackedPluginEntry> {
        let url = url.trim();
        let version = version.trim();

        if url.is_empty() || version.is_empty() {
            return Err(SyncError::InvalidEntry(
                "a repository URL and a version are required".to_string(),
            ));
        }
        if !RepoRef::is_valid(url) {
            return Err(SyncError::InvalidEntry(format!("not a GitHub repository URL: {url}")));
        }
        if self.plugins.iter().any(|p| p.url == url) {
            return Err(SyncError::InvalidEntry(format!("already tracked: {url}")));
        }

        self.plugins.push(TrackedPluginEntry::new(url, version));
        debug!("tracking {url} at {version}");
        Ok(&self.plugins[self.plugins.len() - 1])
    }

    /// Position of the entry whose url or id equals `key`. Urls are matched first.
    pub fn position(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        self.plugins
            .iter()
            .position(|p| p.url == key)
            .or_else(|| self.plugins.iter().position(|p| p.id == key))
    }

    pub fn remove_plugin(&mut self, key: &str) -> SyncResult<TrackedPluginEntry> {
        let index = self.require(key)?;
        Ok(self.plugins.remove(index))
    }

    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> SyncResult<&TrackedPluginEntry> {
        let index = self.require(key)?;
        self.plugins[index].enabled = enabled;
        Ok(&self.plugins[index])
    }

    /// Changes the pinned version. Returns false when `version` is empty or
    /// unchanged and nothing was modified.
    pub fn set_version(&mut self, key: &str, version: &str) -> SyncResult<bool> {
        let index = self.require(key)?;
        let version = version.trim();
        let entry = &mut self.plugins[index];
        if version.is_empty() || version == entry.version {
            return Ok(false);
        }
        entry.version = version.to_string();
        Ok(true)
    }

    fn require(&self, key: &str) -> SyncResult<usize> {
        self.position(key)
            .ok_or_else(|| SyncError::InvalidEntry(format!("no tracked plugin matches {key}")))
    }
}

/// Loads and saves [`PinnerSettings`].
pub struct SettingsStore {
    fs: Arc<dyn PluginFs>,
    dir: String,
    path: String,
}

impl SettingsStore {
    pub fn new(fs: Arc<dyn PluginFs>, layout: &HostLayout) -> Self {
        Self {
            fs,
            dir: layout.data_dir(),
            path: layout.settings_path(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn load(&self) -> SyncResult<PinnerSettings> {
        if !self.fs.exists(&self.path).await? {
            return Ok(PinnerSettings::default());
        }

        let text = self.fs.read(&self.path).await?;
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => Ok(PinnerSettings::from_value_lenient(&value)),
            Err(e) => {
                warn!("ignoring malformed {}: {e}", self.path);
                Ok(PinnerSettings::default())
            }
        }
    }

    pub async fn save(&self, settings: &PinnerSettings) -> SyncResult<()> {
        if !self.fs.exists(&self.dir).await? {
            self.fs.mkdir(&self.dir).await?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        self.fs.write(&self.path, &json).await
    }
}
