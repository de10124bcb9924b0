//! Host integration: the user-facing commands on top of the sync engine.
//!
//! Notifications go to the output writer; diagnostics go to the log.

use anyhow::{Context, Result};
use pinner_github::{GitHubConfig, ReleaseClient};
use pinner_sync::{
    HostLayout, LocalFs, PinnerSettings, PluginFs, PluginScanner, SecretStore, SettingsStore,
    SyncManager, SyncSummary,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const NO_URLS: &str = "No plugins with URLs configured. Add GitHub URLs in settings.";
const SYNC_STARTED: &str = "Starting sync...";
const ALL_UP_TO_DATE: &str = "All plugins are up to date";
const SYNC_FAILED: &str = "Sync failed. Check logs for details.";
const AUTO_SYNC_FAILED: &str = "Auto-sync failed. Check logs for details.";
const SCAN_DONE: &str = "Scanned installed plugins and updated versions";

/// Where the host finds its vault, API and secrets.
#[derive(Clone, Debug)]
pub struct AppOptions {
    pub vault: PathBuf,
    pub config_dir: String,
    pub api_url: Option<String>,
    pub secrets_file: Option<PathBuf>,
}

pub struct App<W> {
    settings_store: SettingsStore,
    settings: PinnerSettings,
    secrets: SecretStore,
    scanner: PluginScanner,
    manager: SyncManager,
    out: W,
}

impl<W: Write> App<W> {
    pub async fn open(options: &AppOptions, out: W) -> Result<Self> {
        anyhow::ensure!(
            options.vault.is_dir(),
            "vault directory {} does not exist",
            options.vault.display()
        );

        let fs: Arc<dyn PluginFs> = Arc::new(LocalFs::new(&options.vault));
        let layout = HostLayout::new(options.config_dir.as_str());

        let mut config = GitHubConfig::default();
        if let Some(url) = &options.api_url {
            config.api_base_url = url.clone();
        }
        let client = Arc::new(ReleaseClient::new(config)?);

        let settings_store = SettingsStore::new(fs.clone(), &layout);
        let settings = settings_store
            .load()
            .await
            .context("failed to load settings")?;
        let manager = SyncManager::open(fs.clone(), client, layout.clone())
            .await
            .context("failed to load local sync state")?;
        let scanner = PluginScanner::new(fs, layout);
        let secrets = match &options.secrets_file {
            Some(path) => SecretStore::new(path),
            None => SecretStore::open_default(),
        };

        debug!(
            "opened vault {} with {} tracked plugin(s)",
            options.vault.display(),
            settings.plugins.len()
        );

        Ok(Self {
            settings_store,
            settings,
            secrets,
            scanner,
            manager,
            out,
        })
    }

    pub fn settings(&self) -> &PinnerSettings {
        &self.settings
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{message}")?;
        Ok(())
    }

    // ── Sync ──

    /// Manual sync. Returns false if the pass could not be completed.
    pub async fn sync(&mut self) -> Result<bool> {
        if self.settings.plugins_with_urls().next().is_none() {
            self.notify(NO_URLS)?;
            return Ok(true);
        }

        self.apply_token().await;
        self.notify(SYNC_STARTED)?;

        match self.manager.sync(&self.settings.plugins).await {
            Ok(summary) => {
                let message = manual_sync_message(&summary);
                self.notify(&message)?;
                self.log_status();
                Ok(true)
            }
            Err(e) => {
                error!("manual sync failed: {e}");
                self.notify(SYNC_FAILED)?;
                Ok(false)
            }
        }
    }

    /// Automatic sync after a scan. Failures are reported, never returned.
    pub async fn auto_sync(&mut self) -> Result<()> {
        if self.settings.plugins_with_urls().next().is_none() {
            debug!("auto-sync skipped: no plugins with URLs");
            return Ok(());
        }

        self.apply_token().await;
        let show = self.settings.show_sync_notification;

        match self.manager.sync(&self.settings.plugins).await {
            Ok(summary) => {
                self.log_status();
                if show && summary.synced > 0 {
                    self.notify(&format!("{} plugin(s) updated", summary.synced))?;
                }
                if show && summary.failed > 0 {
                    self.notify(&format!("{} plugin(s) failed to sync", summary.failed))?;
                }
            }
            Err(e) => {
                error!("auto-sync failed: {e}");
                if show {
                    self.notify(AUTO_SYNC_FAILED)?;
                }
            }
        }
        Ok(())
    }

    async fn apply_token(&self) {
        let name = &self.settings.github_token_secret_name;
        let token = match self.secrets.get(name) {
            Ok(token) => token.unwrap_or_default(),
            Err(e) => {
                warn!("could not read secret {name}, continuing unauthenticated: {e}");
                String::new()
            }
        };
        self.manager.update_token(&token).await;
    }

    fn log_status(&self) {
        match self.manager.last_error() {
            Some(last_error) => info!("sync status: {} ({last_error})", self.manager.status()),
            None => info!("sync status: {}", self.manager.status()),
        }
    }

    // ── Scan ──

    /// Reconciles installed versions into the settings and saves them.
    async fn reconcile_installed(&mut self) -> Result<()> {
        let plugins = self.scanner.reconcile(&self.settings.plugins).await;
        self.settings.plugins = plugins;
        self.save_settings().await
    }

    pub async fn scan(&mut self) -> Result<()> {
        self.reconcile_installed().await?;
        if self.settings.auto_sync_on_load {
            self.auto_sync().await?;
        }
        self.notify(SCAN_DONE)
    }

    /// The on-load hook.
    pub async fn startup(&mut self) -> Result<()> {
        self.reconcile_installed().await?;
        if self.settings.auto_sync_on_load {
            self.auto_sync().await?;
        }
        Ok(())
    }

    // ── Settings ──

    async fn save_settings(&self) -> Result<()> {
        self.settings_store
            .save(&self.settings)
            .await
            .context("failed to save settings")
    }

    pub async fn add(&mut self, url: &str, version: &str) -> Result<()> {
        let entry = self.settings.add_plugin(url, version)?;
        let message = format!("Tracking {} at {}", entry.url, entry.version);
        self.save_settings().await?;
        self.notify(&message)
    }

    pub async fn remove(&mut self, plugin: &str) -> Result<()> {
        let removed = self.settings.remove_plugin(plugin)?;
        self.save_settings().await?;
        self.notify(&format!("Removed {}", display_name(&removed.id, &removed.url)))
    }

    pub async fn set_enabled(&mut self, plugin: &str, enabled: bool) -> Result<()> {
        let entry = self.settings.set_enabled(plugin, enabled)?;
        let message = format!(
            "{} {}",
            if enabled { "Enabled" } else { "Disabled" },
            display_name(&entry.id, &entry.url)
        );
        self.save_settings().await?;
        self.notify(&message)
    }

    pub async fn pin(&mut self, plugin: &str, version: &str) -> Result<()> {
        if self.settings.set_version(plugin, version)? {
            self.save_settings().await?;
            self.notify(&format!("Pinned {plugin} to {}", version.trim()))
        } else {
            self.notify(&format!("{plugin} unchanged"))
        }
    }

    pub fn list(&mut self) -> Result<()> {
        if self.settings.plugins.is_empty() {
            return self.notify("No plugins tracked yet.");
        }

        let lines: Vec<String> = self
            .settings
            .plugins
            .iter()
            .map(|p| {
                format!(
                    "[{}] {:<24} {:<10} {}",
                    if p.enabled { "x" } else { " " },
                    if p.id.is_empty() { "-" } else { p.id.as_str() },
                    p.version,
                    if p.url.is_empty() { "(no url)" } else { p.url.as_str() },
                )
            })
            .collect();
        for line in lines {
            self.notify(&line)?;
        }
        Ok(())
    }

    pub async fn configure(
        &mut self,
        auto_sync: Option<bool>,
        notifications: Option<bool>,
        token_secret_name: Option<String>,
    ) -> Result<()> {
        let changed = auto_sync.is_some() || notifications.is_some() || token_secret_name.is_some();
        if let Some(value) = auto_sync {
            self.settings.auto_sync_on_load = value;
        }
        if let Some(value) = notifications {
            self.settings.show_sync_notification = value;
        }
        if let Some(name) = token_secret_name {
            let name = name.trim();
            anyhow::ensure!(!name.is_empty(), "token secret name cannot be empty");
            self.settings.github_token_secret_name = name.to_string();
        }
        if changed {
            self.save_settings().await?;
        }

        let lines = [
            format!("auto-sync on load: {}", self.settings.auto_sync_on_load),
            format!("sync notifications: {}", self.settings.show_sync_notification),
            format!("token secret name: {}", self.settings.github_token_secret_name),
        ];
        for line in lines {
            self.notify(&line)?;
        }
        Ok(())
    }

    pub fn set_token(&mut self, value: &str) -> Result<()> {
        let name = self.settings.github_token_secret_name.clone();
        self.secrets.set(&name, value.trim())?;
        self.notify(&format!("Token stored as {name}"))
    }

    pub fn clear_token(&mut self) -> Result<()> {
        let name = self.settings.github_token_secret_name.clone();
        if self.secrets.remove(&name)? {
            self.notify(&format!("Token {name} cleared"))
        } else {
            self.notify(&format!("No token stored as {name}"))
        }
    }

    // ── Status ──

    pub fn status(&mut self) -> Result<()> {
        let state = self.manager.local_state().clone();

        let mut lines = vec![match state.last_sync_at {
            Some(at) => format!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => "Last sync: never".to_string(),
        }];

        if !state.downloaded_plugins.is_empty() {
            lines.push("Downloaded plugins:".to_string());
            for (id, record) in &state.downloaded_plugins {
                lines.push(format!(
                    "  {id}  version {}  downloaded {}",
                    record.version,
                    record.downloaded_at.format("%Y-%m-%d")
                ));
            }
        }

        if !state.failed_plugins.is_empty() {
            lines.push("Failed plugins:".to_string());
            for failure in &state.failed_plugins {
                lines.push(format!(
                    "  {}  version {}  error: {}  failed {}",
                    failure.url,
                    failure.version,
                    failure.error,
                    failure.failed_at.format("%Y-%m-%d")
                ));
            }
        }

        for line in lines {
            self.notify(&line)?;
        }
        Ok(())
    }
}

/// One-line result of a manual sync.
pub fn manual_sync_message(summary: &SyncSummary) -> String {
    if summary.failed > 0 {
        summary.to_string()
    } else if summary.synced > 0 {
        format!(
            "{} plugin(s) synced, {} already up to date",
            summary.synced, summary.skipped
        )
    } else {
        ALL_UP_TO_DATE.to_string()
    }
}

fn display_name<'a>(id: &'a str, url: &'a str) -> &'a str {
    if url.is_empty() { id } else { url }
}
