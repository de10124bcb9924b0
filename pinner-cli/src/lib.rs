//! Command-line host for plugins-pinner.
//!
//! Runs the host side of the pinner against a vault on disk:
//! - `sync`, `scan` and `startup` drive the sync engine
//! - `add`, `remove`, `enable`, `disable`, `pin`, `config` and `token` edit settings
//! - `list` and `status` report tracked plugins and the last sync

pub mod app;
pub mod cli;

use anyhow::Result;
use app::App;
use cli::{Cli, Commands, TokenAction};
use std::io::Write;

/// Executes one command. Returns false when the command should exit non-zero.
pub async fn run<W: Write>(cli: Cli, out: W) -> Result<bool> {
    let mut app = App::open(&cli.app_options(), out).await?;

    match cli.command {
        Commands::Sync => return app.sync().await,
        Commands::Scan => app.scan().await?,
        Commands::Startup => app.startup().await?,
        Commands::Add { url, version } => app.add(&url, &version).await?,
        Commands::Remove { plugin } => app.remove(&plugin).await?,
        Commands::Enable { plugin } => app.set_enabled(&plugin, true).await?,
        Commands::Disable { plugin } => app.set_enabled(&plugin, false).await?,
        Commands::Pin { plugin, version } => app.pin(&plugin, &version).await?,
        Commands::List => app.list()?,
        Commands::Config {
            auto_sync,
            notifications,
            token_secret_name,
        } => app.configure(auto_sync, notifications, token_secret_name).await?,
        Commands::Token { action } => match action {
            TokenAction::Set { value } => app.set_token(&value)?,
            TokenAction::Clear => app.clear_token()?,
        },
        Commands::Status => app.status()?,
    }

    Ok(true)
}
