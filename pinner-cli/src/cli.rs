//! Command-line definitions.

use crate::app::AppOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pin Obsidian plugins to exact GitHub release versions and keep a vault in sync.
#[derive(Parser, Debug)]
#[command(name = "pinner", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory
    #[arg(long, global = true, env = "PINNER_VAULT", default_value = ".")]
    pub vault: PathBuf,

    /// Name of the vault's configuration directory
    #[arg(long, global = true, env = "PINNER_CONFIG_DIR", default_value = ".obsidian")]
    pub config_dir: String,

    /// GitHub API base URL
    #[arg(long, global = true, env = "PINNER_API_URL")]
    pub api_url: Option<String>,

    /// Secrets file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "PINNER_SECRETS_FILE")]
    pub secrets_file: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Sync all tracked plugins with a URL
    Sync,

    /// Scan installed plugins and update versions
    Scan,

    /// Run the on-load routine: scan, then sync if auto-sync is on
    Startup,

    /// Track a plugin repository at a version
    Add {
        /// e.g. https://github.com/owner/repo
        url: String,
        /// Release tag to install, e.g. 1.0.0
        version: String,
    },

    /// Stop tracking a plugin
    Remove {
        /// Repository URL or plugin id
        plugin: String,
    },

    /// Include a plugin in syncs
    Enable { plugin: String },

    /// Exclude a plugin from syncs
    Disable { plugin: String },

    /// Change the pinned version of a plugin
    Pin { plugin: String, version: String },

    /// List tracked plugins
    List,

    /// Show or change sync behaviour
    Config {
        /// Sync automatically on startup
        #[arg(long)]
        auto_sync: Option<bool>,

        /// Report automatic sync results
        #[arg(long)]
        notifications: Option<bool>,

        /// Name of the secret holding the GitHub token
        #[arg(long)]
        token_secret_name: Option<String>,
    },

    /// Manage the GitHub token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show the last sync result
    Status,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum TokenAction {
    /// Store a personal access token (raises the hourly limit from 60 to 5000)
    Set { value: String },
    /// Remove the stored token
    Clear,
}

impl Cli {
    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            vault: self.vault.clone(),
            config_dir: self.config_dir.clone(),
            api_url: self.api_url.clone(),
            secrets_file: self.secrets_file.clone(),
        }
    }
}
