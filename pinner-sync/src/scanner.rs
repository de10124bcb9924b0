//! Installed-state scanner.
//!
//! Reads every plugin descriptor under `<config-dir>/plugins` and folds the
//! installed versions back into the desired-state list.

use crate::fs::PluginFs;
use crate::layout::HostLayout;
use crate::types::{PluginDescriptor, TrackedPluginEntry};
use pinner_github::DESCRIPTOR_ASSET;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A plugin found on disk. `id` is its directory name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub id: String,
    pub descriptor: PluginDescriptor,
}

pub struct PluginScanner {
    fs: Arc<dyn PluginFs>,
    layout: HostLayout,
}

impl PluginScanner {
    pub fn new(fs: Arc<dyn PluginFs>, layout: HostLayout) -> Self {
        Self { fs, layout }
    }

    /// Lists installed plugins with a readable descriptor, in directory order.
    ///
    /// Plugins whose descriptor is missing or malformed are skipped. A
    /// failure to list the plugin root yields an empty list.
    pub async fn scan_installed(&self) -> Vec<InstalledPlugin> {
        let root = self.layout.plugins_root();
        let listing = match self.fs.list(&root).await {
            Ok(listing) => listing,
            Err(e) => {
                error!("failed to list plugin directory {root}: {e}");
                return Vec::new();
            }
        };

        let mut installed = Vec::new();
        for folder in &listing.folders {
            let Some(id) = folder.rsplit('/').next().filter(|id| !id.is_empty()) else {
                continue;
            };

            let path = format!("{folder}/{DESCRIPTOR_ASSET}");
            let text = match self.fs.read(&path).await {
                Ok(text) => text,
                Err(e) => {
                    debug!("no readable descriptor for {id}: {e}");
                    continue;
                }
            };

            match PluginDescriptor::parse(&text) {
                Some(descriptor) => installed.push(InstalledPlugin {
                    id: id.to_string(),
                    descriptor,
                }),
                None => warn!("invalid descriptor for plugin {id}, skipping"),
            }
        }

        debug!("scan found {} installed plugins", installed.len());
        installed
    }

    /// Scans and reconciles `desired` with what is installed.
    pub async fn reconcile(&self, desired: &[TrackedPluginEntry]) -> Vec<TrackedPluginEntry> {
        let installed = self.scan_installed().await;
        reconcile_entries(desired, &installed)
    }
}

/// Merges installed versions into `desired`.
///
/// Installed plugins come first in scan order: a matching desired entry
/// (by id) gets its version overwritten, an unknown plugin becomes a new
/// disabled entry with no url. Desired entries with no installed
/// counterpart follow, unchanged and in their original order.
pub fn reconcile_entries(
    desired: &[TrackedPluginEntry],
    installed: &[InstalledPlugin],
) -> Vec<TrackedPluginEntry> {
    // Later entries win on duplicate ids.
    let by_id: HashMap<&str, &TrackedPluginEntry> =
        desired.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut reconciled: Vec<TrackedPluginEntry> = installed
        .iter()
        .map(|plugin| match by_id.get(plugin.id.as_str()) {
            Some(existing) => TrackedPluginEntry {
                version: plugin.descriptor.version.clone(),
                ..(*existing).clone()
            },
            None => TrackedPluginEntry {
                id: plugin.id.clone(),
                url: String::new(),
                version: plugin.descriptor.version.clone(),
                enabled: false,
            },
        })
        .collect();

    let installed_ids: HashSet<&str> = installed.iter().map(|p| p.id.as_str()).collect();
    reconciled.extend(
        desired
            .iter()
            .filter(|e| !installed_ids.contains(e.id.as_str()))
            .cloned(),
    );
    reconciled
}
