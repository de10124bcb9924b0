//! Plugin installer.
//!
//! Materializes a pinned release into `<config-dir>/plugins/<id>`:
//! 1. Fetch the release by exact tag
//! 2. Resolve `main.js` and `manifest.json` (and `styles.css` if present)
//! 3. Download and validate the descriptor before touching the filesystem
//! 4. Write the bundle, then the descriptor bytes as fetched
//! 5. Best-effort stylesheet
//!
//! The install directory comes from the descriptor's `id`, never from the
//! repository name.

use crate::error::SyncError;
use crate::fs::PluginFs;
use crate::layout::HostLayout;
use crate::types::PluginDescriptor;
use pinner_github::{
    GitHubError, ReleaseAsset, ReleaseClient, RepoRef, BUNDLE_ASSET, DESCRIPTOR_ASSET,
    STYLESHEET_ASSET,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single install failed. Never escapes [`PluginInstaller::install`].
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Release is missing required files (main.js, manifest.json)")]
    MissingAssets,

    #[error("Invalid manifest.json format")]
    InvalidDescriptor,

    #[error(transparent)]
    Release(#[from] GitHubError),

    #[error(transparent)]
    Storage(#[from] SyncError),
}

/// Result of [`PluginInstaller::install`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Success { plugin_id: String, has_styles: bool },
    Failure { error: String },
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Success { .. })
    }
}

/// Writes release assets into the host's plugin directory.
pub struct PluginInstaller {
    fs: Arc<dyn PluginFs>,
    client: Arc<ReleaseClient>,
    layout: HostLayout,
}

impl PluginInstaller {
    pub fn new(fs: Arc<dyn PluginFs>, client: Arc<ReleaseClient>, layout: HostLayout) -> Self {
        Self { fs, client, layout }
    }

    /// Installs `repo` at release `version`. Every failure is reported in
    /// the outcome; nothing is returned as an error.
    pub async fn install(&self, repo: &RepoRef, version: &str) -> InstallOutcome {
        match self.try_install(repo, version).await {
            Ok((plugin_id, has_styles)) => {
                info!("installed {plugin_id} {version} from {repo}");
                InstallOutcome::Success {
                    plugin_id,
                    has_styles,
                }
            }
            Err(e) => {
                warn!("install of {repo} {version} failed: {e}");
                InstallOutcome::Failure {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_install(&self, repo: &RepoRef, version: &str) -> Result<(String, bool), InstallError> {
        let release = self.client.fetch_release(repo, version).await?;
        let assets = release
            .required_assets()
            .ok_or(InstallError::MissingAssets)?;

        let descriptor_bytes = self.client.download_binary(&assets.descriptor).await?;
        let descriptor_text =
            String::from_utf8(descriptor_bytes).map_err(|_| InstallError::InvalidDescriptor)?;
        let descriptor = PluginDescriptor::parse(&descriptor_text)
            .filter(PluginDescriptor::has_safe_id)
            .ok_or(InstallError::InvalidDescriptor)?;

        let bundle = self.client.download_binary(&assets.bundle).await?;

        let plugin_id = descriptor.id;
        let dir = self.layout.plugin_dir(&plugin_id);
        if !self.fs.exists(&dir).await? {
            debug!("creating plugin directory {dir}");
            self.fs.mkdir(&dir).await?;
        }

        self.fs
            .write_binary(&self.layout.plugin_file(&plugin_id, BUNDLE_ASSET), &bundle)
            .await?;
        self.fs
            .write(
                &self.layout.plugin_file(&plugin_id, DESCRIPTOR_ASSET),
                &descriptor_text,
            )
            .await?;

        let has_styles = match &assets.stylesheet {
            Some(asset) => self.install_stylesheet(&plugin_id, asset).await,
            None => false,
        };

        Ok((plugin_id, has_styles))
    }

    async fn install_stylesheet(&self, plugin_id: &str, asset: &ReleaseAsset) -> bool {
        let css = match self.client.download_text(asset).await {
            Ok(css) => css,
            Err(e) => {
                debug!("skipping stylesheet for {plugin_id}: {e}");
                return false;
            }
        };

        let path = self.layout.plugin_file(plugin_id, STYLESHEET_ASSET);
        match self.fs.write(&path, &css).await {
            Ok(()) => true,
            Err(e) => {
                debug!("skipping stylesheet for {plugin_id}: {e}");
                false
            }
        }
    }

    /// Both the bundle and the descriptor exist for `plugin_id`.
    pub async fn is_installed(&self, plugin_id: &str) -> bool {
        for file in [BUNDLE_ASSET, DESCRIPTOR_ASSET] {
            let path = self.layout.plugin_file(plugin_id, file);
            if !self.fs.exists(&path).await.unwrap_or(false) {
                return false;
            }
        }
        true
    }

    /// Version from the on-disk descriptor, or `None` if it is absent or unreadable.
    pub async fn installed_version(&self, plugin_id: &str) -> Option<String> {
        let path = self.layout.plugin_file(plugin_id, DESCRIPTOR_ASSET);
        if !self.fs.exists(&path).await.ok()? {
            return None;
        }

        let text = self.fs.read(&path).await.ok()?;
        PluginDescriptor::parse(&text).map(|d| d.version)
    }
}
