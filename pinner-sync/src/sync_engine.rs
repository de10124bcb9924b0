//! Sync pass orchestration.
//!
//! A pass walks the desired-state snapshot in order and, for each enabled
//! entry with a url:
//! - skips it when a downloaded record for the same url already has the
//!   exact desired version (no network access)
//! - otherwise installs the pinned release
//!
//! Per-entry failures are collected, never raised. The downloaded and
//! failed records are committed with a single write at the end of the pass.

use crate::error::SyncResult;
use crate::fs::PluginFs;
use crate::installer::{InstallOutcome, PluginInstaller};
use crate::layout::HostLayout;
use crate::local_state::LocalStateStore;
use crate::types::{
    DownloadedPluginRecord, FailedPluginRecord, LocalSyncState, PluginSyncResult, SyncStatus,
    SyncSummary, TrackedPluginEntry,
};
use chrono::Utc;
use pinner_github::{ReleaseClient, RepoRef};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const INVALID_URL_ERROR: &str = "Invalid GitHub URL";
const UNKNOWN_ERROR: &str = "Unknown error";

/// Runs sync passes and owns the local sync record.
///
/// `sync` takes `&mut self`, so two passes can never overlap on one manager.
pub struct SyncManager {
    client: Arc<ReleaseClient>,
    installer: PluginInstaller,
    store: LocalStateStore,
    state: LocalSyncState,
    status: SyncStatus,
    last_error: Option<String>,
}

impl SyncManager {
    /// Creates a manager over already-loaded local state.
    pub fn new(
        fs: Arc<dyn PluginFs>,
        client: Arc<ReleaseClient>,
        layout: HostLayout,
        state: LocalSyncState,
    ) -> Self {
        let store = LocalStateStore::new(fs.clone(), &layout);
        let installer = PluginInstaller::new(fs, client.clone(), layout);

        Self {
            client,
            installer,
            store,
            state,
            status: SyncStatus::Idle,
            last_error: None,
        }
    }

    /// Creates a manager, loading local state from `sync.json`.
    pub async fn open(
        fs: Arc<dyn PluginFs>,
        client: Arc<ReleaseClient>,
        layout: HostLayout,
    ) -> SyncResult<Self> {
        let state = LocalStateStore::new(fs.clone(), &layout).load().await?;
        debug!(
            "loaded local sync state with {} downloaded plugin(s)",
            state.downloaded_plugins.len()
        );
        Ok(Self::new(fs, client, layout, state))
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Last committed local state.
    pub fn local_state(&self) -> &LocalSyncState {
        &self.state
    }

    /// Swaps the credential used by every later request. An empty token
    /// means unauthenticated access.
    pub async fn update_token(&self, token: &str) {
        self.client.set_token(token).await;
        debug!(
            "GitHub token updated (authenticated: {})",
            self.client.is_authenticated().await
        );
    }

    /// Back to idle, clearing the last error.
    pub fn reset_status(&mut self) {
        self.status = SyncStatus::Idle;
        self.last_error = None;
    }

    // ── Sync pass ──

    /// Runs one pass over `desired`.
    ///
    /// Only a failure to persist the local state is returned as an error;
    /// in that case the in-memory state keeps its previous value.
    pub async fn sync(&mut self, desired: &[TrackedPluginEntry]) -> SyncResult<SyncSummary> {
        self.status = SyncStatus::Syncing;
        self.last_error = None;

        let candidates: Vec<&TrackedPluginEntry> =
            desired.iter().filter(|e| e.is_syncable()).collect();
        info!("sync pass started for {} plugin(s)", candidates.len());

        let mut downloaded = self.state.downloaded_plugins.clone();
        let mut failed = Vec::new();
        let mut results = Vec::with_capacity(candidates.len());

        for entry in candidates {
            let result = self.sync_plugin(entry).await;

            if result.success && !result.skipped {
                if let Some(plugin_id) = &result.plugin_id {
                    downloaded.insert(
                        plugin_id.clone(),
                        DownloadedPluginRecord {
                            url: entry.url.clone(),
                            version: entry.version.clone(),
                            downloaded_at: Utc::now(),
                            has_styles: result.has_styles.unwrap_or(false),
                        },
                    );
                }
            } else if !result.success {
                failed.push(FailedPluginRecord {
                    url: entry.url.clone(),
                    version: entry.version.clone(),
                    error: result
                        .error
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                    failed_at: Utc::now(),
                });
            }

            results.push(result);
        }

        let next = LocalSyncState {
            downloaded_plugins: downloaded,
            last_sync_at: Some(Utc::now()),
            failed_plugins: failed,
        };

        if let Err(e) = self.store.save(&next).await {
            error!("failed to persist sync state to {}: {e}", self.store.path());
            self.status = SyncStatus::Error;
            self.last_error = Some(e.to_string());
            return Err(e);
        }
        self.state = next;

        let summary = SyncSummary::from_results(results);
        if summary.failed > 0 {
            self.status = SyncStatus::Error;
            self.last_error = Some(format!("{} plugin(s) failed to sync", summary.failed));
            warn!("sync pass finished with failures: {summary}");
        } else {
            self.status = SyncStatus::Success;
            info!("sync pass finished: {summary}");
        }

        Ok(summary)
    }

    async fn sync_plugin(&self, entry: &TrackedPluginEntry) -> PluginSyncResult {
        let Some(repo) = RepoRef::parse(&entry.url) else {
            warn!("cannot parse repository url {:?}", entry.url);
            return PluginSyncResult::failed(entry, INVALID_URL_ERROR);
        };

        if let Some((plugin_id, record)) = self.state.find_downloaded_by_url(&entry.url) {
            if record.version == entry.version {
                debug!("{plugin_id} already at {}, skipping", entry.version);
                return PluginSyncResult::skipped(entry, plugin_id.to_string());
            }
        }

        match self.installer.install(&repo, &entry.version).await {
            InstallOutcome::Success {
                plugin_id,
                has_styles,
            } => PluginSyncResult::installed(entry, plugin_id, has_styles),
            InstallOutcome::Failure { error } => PluginSyncResult::failed(entry, error),
        }
    }
}
