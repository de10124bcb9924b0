//! Plugin synchronization engine for plugins-pinner.
//!
//! Keeps a host's installed plugins aligned with a pinned desired state:
//! - [`PluginInstaller`] writes a pinned release into the plugin directory
//! - [`PluginScanner`] reads installed descriptors and reconciles versions
//! - [`SyncManager`] runs idempotent sync passes and records the outcome
//!
//! All disk access goes through [`PluginFs`]. Release lookups and downloads
//! come from `pinner-github`.

pub mod error;
pub mod fs;
pub mod installer;
pub mod layout;
pub mod local_state;
pub mod scanner;
pub mod secrets;
pub mod settings;
pub mod sync_engine;
pub mod types;

pub use error::{SyncError, SyncResult};
pub use fs::{DirListing, LocalFs, PluginFs};
pub use installer::{InstallError, InstallOutcome, PluginInstaller};
pub use layout::HostLayout;
pub use local_state::LocalStateStore;
pub use scanner::{reconcile_entries, InstalledPlugin, PluginScanner};
pub use secrets::SecretStore;
pub use settings::{PinnerSettings, SettingsStore};
pub use sync_engine::SyncManager;
pub use types::*;
