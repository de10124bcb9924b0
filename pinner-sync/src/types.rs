//! Desired state, descriptors and sync bookkeeping types.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One row of desired state: a plugin pinned to a release tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPluginEntry {
    /// Plugin id from its descriptor. Empty until a scan or install resolves it.
    #[serde(default)]
    pub id: String,
    /// Repository URL. Empty when not configured yet.
    #[serde(default)]
    pub url: String,
    /// Desired release tag, without a leading "v".
    pub version: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl TrackedPluginEntry {
    pub fn new(url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            url: url.into(),
            version: version.into(),
            enabled: true,
        }
    }

    /// Whether the entry takes part in sync passes.
    pub fn is_syncable(&self) -> bool {
        self.enabled && !self.url.trim().is_empty()
    }
}

/// A plugin's `manifest.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(rename = "minAppVersion")]
    pub min_host_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_desktop_only: Option<bool>,
}

impl PluginDescriptor {
    /// Parses descriptor JSON, returning `None` on any syntax or shape error.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// Whether `id` can name a directory under the plugin root.
    pub fn has_safe_id(&self) -> bool {
        let id = self.id.as_str();
        !id.trim().is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
    }
}

/// A successful, non-skipped download. Keyed by plugin id in [`LocalSyncState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedPluginRecord {
    pub url: String,
    pub version: String,
    pub downloaded_at: DateTime<Utc>,
    pub has_styles: bool,
}

/// A failure from the most recent pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPluginRecord {
    pub url: String,
    pub version: String,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Local, per-device record of what the engine downloaded and what failed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSyncState {
    #[serde(default)]
    pub downloaded_plugins: BTreeMap<String, DownloadedPluginRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_plugins: Vec<FailedPluginRecord>,
}

impl LocalSyncState {
    /// Builds state from arbitrary JSON, replacing each malformed field with
    /// its default while keeping the others.
    pub fn from_value_lenient(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            downloaded_plugins: field_or_default(obj, "downloadedPlugins"),
            last_sync_at: field_or_default(obj, "lastSyncAt"),
            failed_plugins: field_or_default(obj, "failedPlugins"),
        }
    }

    /// Finds the downloaded record whose stored url equals `url`, with its plugin id.
    pub fn find_downloaded_by_url(&self, url: &str) -> Option<(&str, &DownloadedPluginRecord)> {
        self.downloaded_plugins
            .iter()
            .find(|(_, record)| record.url == url)
            .map(|(id, record)| (id.as_str(), record))
    }
}

/// Reads `key` from `obj`, falling back to `T::default()` when it is
/// missing or does not deserialize.
pub(crate) fn field_or_default<T>(obj: &Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    field_or(obj, key, T::default)
}

pub(crate) fn field_or<T>(obj: &Map<String, Value>, key: &str, default: impl FnOnce() -> T) -> T
where
    T: DeserializeOwned,
{
    obj.get(key)
        .and_then(|v| T::deserialize(v).ok())
        .unwrap_or_else(default)
}

/// Sync engine state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Outcome for one entry of a sync pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSyncResult {
    pub url: String,
    pub version: String,
    pub success: bool,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_styles: Option<bool>,
}

impl PluginSyncResult {
    pub fn installed(entry: &TrackedPluginEntry, plugin_id: String, has_styles: bool) -> Self {
        Self {
            url: entry.url.clone(),
            version: entry.version.clone(),
            success: true,
            skipped: false,
            error: None,
            plugin_id: Some(plugin_id),
            has_styles: Some(has_styles),
        }
    }

    pub fn skipped(entry: &TrackedPluginEntry, plugin_id: String) -> Self {
        Self {
            url: entry.url.clone(),
            version: entry.version.clone(),
            success: true,
            skipped: true,
            error: None,
            plugin_id: Some(plugin_id),
            has_styles: None,
        }
    }

    pub fn failed(entry: &TrackedPluginEntry, error: impl Into<String>) -> Self {
        Self {
            url: entry.url.clone(),
            version: entry.version.clone(),
            success: false,
            skipped: false,
            error: Some(error.into()),
            plugin_id: None,
            has_styles: None,
        }
    }
}

/// Aggregate result of a sync pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<PluginSyncResult>,
}

impl SyncSummary {
    /// Derives the counts from `results`.
    pub fn from_results(results: Vec<PluginSyncResult>) -> Self {
        Self {
            total: results.len(),
            synced: results.iter().filter(|r| r.success && !r.skipped).count(),
            skipped: results.iter().filter(|r| r.skipped).count(),
            failed: results.iter().filter(|r| !r.success).count(),
            results,
        }
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} synced, {} skipped, {} failed",
            self.synced, self.skipped, self.failed
        )
    }
}
