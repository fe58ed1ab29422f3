//! Command-line interface definition for the guild dashboard
//!
//! This module defines the CLI structure using clap's derive API. Each
//! command maps onto one dashboard operation.

use clap::{Parser, Subcommand};

/// Guild dashboard - manage your Discord bot from the terminal
///
/// Signs in with a dashboard session token, lists the guilds you manage and
/// edits their bot configuration, with AI-assisted setup.
#[derive(Parser, Debug, Clone)]
#[command(name = "guild-dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the dashboard backend base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Store a session token and confirm it with the backend
    Login {
        /// Login redirect URL carrying `session_token`
        #[arg(long, conflicts_with = "token")]
        url: Option<String>,

        /// Session token to store
        #[arg(long)]
        token: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the guilds you manage
    Guilds {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Include guilds you cannot manage
        #[arg(long)]
        all: bool,
    },

    /// Show bot statistics and the XP leaderboard
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the bot invite link of a guild
    Invite {
        /// Guild id
        guild: String,
    },

    /// Ask the bot to run an action in a guild
    Trigger {
        /// Guild id
        guild: String,

        /// Action name
        action: String,
    },

    /// Show or edit guild settings
    Settings {
        /// Settings subcommand
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Ask the AI architect for a server structure plan
    Plan {
        /// Guild id
        guild: String,

        /// Description of the desired server architecture
        #[arg(short, long)]
        prompt: String,

        /// Execute the plan right away
        #[arg(long)]
        execute: bool,
    },

    /// Let the AI auditor link settings to existing channels and roles
    Audit {
        /// Guild id
        guild: String,

        /// Apply the suggested links to the form
        #[arg(long)]
        apply: bool,

        /// Save the settings after applying
        #[arg(long, requires = "apply")]
        save: bool,
    },

    /// Watch the live signal log
    Logs {
        /// Number of log lines to show before exiting
        #[arg(long, default_value_t = 5)]
        ticks: u32,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the settings of a guild
    Show {
        /// Guild id
        guild: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change settings of a guild and save them
    Set {
        /// Guild id
        guild: String,

        /// Assignments such as `prefix=?` or `log_channel=123`
        #[arg(required = true, value_name = "KEY=VALUE")]
        values: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            api_base: None,
            verbose: false,
            command: Commands::Whoami { json: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.api_base.is_none());
        assert!(matches!(cli.command, Commands::Whoami { json: false }));
    }

    #[test]
    fn test_cli_parse_login_with_token() {
        let cli = Cli::try_parse_from(["guild-dashboard", "login", "--token", "abc"]).unwrap();
        if let Commands::Login { url, token } = cli.command {
            assert_eq!(url, None);
            assert_eq!(token, Some("abc".to_string()));
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_login_url_conflicts_with_token() {
        let cli = Cli::try_parse_from([
            "guild-dashboard",
            "login",
            "--token",
            "abc",
            "--url",
            "http://x/?session_token=y",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "guild-dashboard",
            "--api-base",
            "http://api.test",
            "-v",
            "guilds",
            "--all",
        ])
        .unwrap();
        assert_eq!(cli.api_base, Some("http://api.test".to_string()));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Guilds {
                json: false,
                all: true
            }
        ));
    }

    #[test]
    fn test_cli_parse_settings_set() {
        let cli = Cli::try_parse_from([
            "guild-dashboard",
            "settings",
            "set",
            "42",
            "prefix=?",
            "vibe=hype",
        ])
        .unwrap();
        if let Commands::Settings {
            command: SettingsCommand::Set { guild, values },
        } = cli.command
        {
            assert_eq!(guild, "42");
            assert_eq!(values, vec!["prefix=?", "vibe=hype"]);
        } else {
            panic!("Expected settings set command");
        }
    }

    #[test]
    fn test_cli_settings_set_requires_values() {
        assert!(Cli::try_parse_from(["guild-dashboard", "settings", "set", "42"]).is_err());
    }

    #[test]
    fn test_cli_parse_plan() {
        let cli = Cli::try_parse_from([
            "guild-dashboard",
            "plan",
            "1",
            "--prompt",
            "a gaming hub",
            "--execute",
        ])
        .unwrap();
        if let Commands::Plan {
            guild,
            prompt,
            execute,
        } = cli.command
        {
            assert_eq!(guild, "1");
            assert_eq!(prompt, "a gaming hub");
            assert!(execute);
        } else {
            panic!("Expected Plan command");
        }
    }

    #[test]
    fn test_cli_audit_save_requires_apply() {
        assert!(Cli::try_parse_from(["guild-dashboard", "audit", "1", "--save"]).is_err());
        assert!(Cli::try_parse_from(["guild-dashboard", "audit", "1", "--apply", "--save"]).is_ok());
    }

    #[test]
    fn test_cli_logs_default_ticks() {
        let cli = Cli::try_parse_from(["guild-dashboard", "logs"]).unwrap();
        assert!(matches!(cli.command, Commands::Logs { ticks: 5 }));
    }
}
