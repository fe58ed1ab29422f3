/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint. Each one
builds a [`DashboardClient`] from the configuration, restores the stored
session and drives one dashboard operation, rendering the view-model to the
terminal.

- `auth`     - login, logout, whoami
- `guilds`   - guild list, invite links, trigger actions, stats
- `settings` - show and edit guild settings
- `ai`       - AI architect plans and AI audits
- `logs`     - live signal log
*/

pub mod ai;
pub mod auth;
pub mod guilds;
pub mod logs;
pub mod settings;

use std::sync::Arc;

use anyhow::bail;
use colored::Colorize;

use crate::api::HttpDashboardApi;
use crate::config::Config;
use crate::dashboard::{AuthState, DashboardClient, Selection, SettingsLoad};
use crate::error::{DashboardError, Result};
use crate::session::build_session_store;

/// Build a controller talking to the configured backend
///
/// # Arguments
///
/// * `config` - Loaded configuration
///
/// # Errors
///
/// Returns error if the API base URL is invalid
pub fn build_client(config: &Config) -> Result<DashboardClient> {
    let api = HttpDashboardApi::new(&config.api)?;
    let store = build_session_store(&config.session);
    Ok(DashboardClient::new(Arc::new(api), store, config.ui.clone()))
}

/// Build a controller and restore the stored session
///
/// # Errors
///
/// Returns [`DashboardError::NotAuthenticated`] when there is no stored
/// token or the backend does not accept it
pub async fn authenticated_client(config: &Config) -> Result<DashboardClient> {
    let client = build_client(config)?;
    match client.bootstrap(None).await {
        AuthState::Authenticated => Ok(client),
        _ => {
            eprintln!(
                "{}",
                "No valid session. Run `guild-dashboard login` first.".yellow()
            );
            Err(DashboardError::NotAuthenticated.into())
        }
    }
}

/// Select a guild and require its configuration form to be loaded
///
/// # Errors
///
/// Returns error when the guild is unknown, still needs the bot invited, or
/// its settings cannot be loaded
pub async fn open_guild(client: &DashboardClient, guild_id: &str) -> Result<()> {
    match client.select_guild(guild_id).await? {
        Selection::Configure(SettingsLoad::Loaded) => Ok(()),
        Selection::Configure(_) => bail!("Could not load the settings of guild {}", guild_id),
        Selection::Invite(Some(url)) => {
            bail!("The bot has not joined guild {} yet. Invite it: {}", guild_id, url)
        }
        Selection::Invite(None) => bail!("The bot has not joined guild {} yet", guild_id),
    }
}

/// Print and clear the notices raised by the controller
pub fn print_alerts(client: &DashboardClient) {
    for alert in client.take_alerts() {
        println!("{} {}", "!".yellow().bold(), alert);
    }
}
