//! Guild Dashboard - admin console for the guild bot
//!
#![doc = "Guild Dashboard - admin console for the guild bot"]
#![doc = "Main entry point for the dashboard CLI."]

use anyhow::Result;

use guild_dashboard::cli::{Cli, Commands, SettingsCommand};
use guild_dashboard::commands;
use guild_dashboard::config::Config;
use guild_dashboard::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Initialize tracing from the logging section
    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    tracing::debug!("Using dashboard API at {}", config.api.base_url);

    // Execute command
    match cli.command {
        Commands::Login { url, token } => {
            tracing::info!("Starting login");
            commands::auth::login(&config, url, token).await
        }
        Commands::Logout => commands::auth::logout(&config),
        Commands::Whoami { json } => commands::auth::whoami(&config, json).await,
        Commands::Guilds { json, all } => commands::guilds::list_guilds(&config, json, all).await,
        Commands::Stats { json } => commands::guilds::stats(&config, json).await,
        Commands::Invite { guild } => commands::guilds::invite(&config, &guild).await,
        Commands::Trigger { guild, action } => {
            tracing::info!("Triggering {} in guild {}", action, guild);
            commands::guilds::trigger(&config, &guild, &action).await
        }
        Commands::Settings { command } => match command {
            SettingsCommand::Show { guild, json } => {
                commands::settings::show_settings(&config, &guild, json).await
            }
            SettingsCommand::Set { guild, values } => {
                commands::settings::set_settings(&config, &guild, &values).await
            }
        },
        Commands::Plan {
            guild,
            prompt,
            execute,
        } => {
            tracing::info!("Requesting architecture plan for guild {}", guild);
            if execute {
                tracing::debug!("Plan will be executed once generated");
            }
            commands::ai::plan(&config, &guild, &prompt, execute).await
        }
        Commands::Audit { guild, apply, save } => {
            tracing::info!("Starting AI audit for guild {}", guild);
            commands::ai::audit(&config, &guild, apply, save).await
        }
        Commands::Logs { ticks } => commands::logs::watch_logs(&config, ticks).await,
    }
}
