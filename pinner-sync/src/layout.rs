//! Virtual paths inside the host's configuration directory.

use serde::{Deserialize, Serialize};

/// Default name of the host's configuration directory inside a vault.
pub const DEFAULT_CONFIG_DIR: &str = ".obsidian";

/// Directory under the config dir holding one folder per plugin.
pub const PLUGINS_DIR: &str = "plugins";

/// Plugin id of the pinner itself; its data lives in `plugins/<this>`.
pub const PINNER_PLUGIN_ID: &str = "plugins-pinner";

/// Settings file (desired state and behaviour flags).
pub const SETTINGS_FILE: &str = "data.json";

/// Local, non-synced record of downloads and failures.
pub const LOCAL_STATE_FILE: &str = "sync.json";

/// Where plugins live relative to the host root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostLayout {
    pub config_dir: String,
}

impl Default for HostLayout {
    fn default() -> Self {
        Self {
            config_dir: DEFAULT_CONFIG_DIR.to_string(),
        }
    }
}

impl HostLayout {
    pub fn new(config_dir: impl Into<String>) -> Self {
        let config_dir: String = config_dir.into();
        Self {
            config_dir: config_dir.trim_matches('/').to_string(),
        }
    }

    /// `<config-dir>/plugins`
    pub fn plugins_root(&self) -> String {
        join(&self.config_dir, PLUGINS_DIR)
    }

    /// `<config-dir>/plugins/<id>`
    pub fn plugin_dir(&self, id: &str) -> String {
        join(&self.plugins_root(), id)
    }

    pub fn plugin_file(&self, id: &str, file: &str) -> String {
        join(&self.plugin_dir(id), file)
    }

    /// The pinner's own data directory.
    pub fn data_dir(&self) -> String {
        self.plugin_dir(PINNER_PLUGIN_ID)
    }

    pub fn settings_path(&self) -> String {
        join(&self.data_dir(), SETTINGS_FILE)
    }

    pub fn local_state_path(&self) -> String {
        join(&self.data_dir(), LOCAL_STATE_FILE)
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}
