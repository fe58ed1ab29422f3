//! Configuration management for the guild dashboard
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storage key under which the session token is persisted
pub const SESSION_TOKEN_KEY: &str = "prime_session_token";

/// Main configuration structure
///
/// Holds the backend API location, where the session token lives,
/// the timings of the dashboard's transient UI states, and logging.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Session token persistence
    #[serde(default)]
    pub session: SessionConfig,
    /// Dashboard timings and panel capacities
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the dashboard backend (scheme, host and port)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("guild-dashboard/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    /// OS native credential store
    Keyring,
    /// JSON file in the user's data directory
    #[default]
    File,
    /// Process memory only; nothing survives the process
    Memory,
}

impl std::str::FromStr for SessionBackend {
    type Err = DashboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(DashboardError::Config(format!(
                "Invalid session backend: {}. Must be one of: keyring, file, memory",
                other
            ))),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: SessionBackend,

    /// Explicit path of the session file (file backend only)
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Key under which the token is stored
    #[serde(default = "default_session_key")]
    pub key: String,
}

fn default_session_key() -> String {
    SESSION_TOKEN_KEY.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            file_path: None,
            key: default_session_key(),
        }
    }
}

impl SessionConfig {
    /// Path of the session file, falling back to the platform data directory
    pub fn resolved_file_path(&self) -> PathBuf {
        if let Some(path) = &self.file_path {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "guild-dashboard")
            .map(|dirs| dirs.data_dir().join("session.json"))
            .unwrap_or_else(|| PathBuf::from(".guild-dashboard").join("session.json"))
    }
}

/// Timings and capacities of the dashboard's transient UI state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Delay before a save/trigger status label reverts (ms)
    #[serde(default = "default_status_revert_ms")]
    pub status_revert_ms: u64,

    /// Delay before a failed AI control is restored (ms)
    #[serde(default = "default_ai_error_revert_ms")]
    pub ai_error_revert_ms: u64,

    /// Delay before the plan review hides after a successful execute (ms)
    #[serde(default = "default_ai_success_hide_ms")]
    pub ai_success_hide_ms: u64,

    /// How long an applied suggestion stays highlighted (ms)
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,

    /// Log ticker interval (ms)
    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    /// Maximum lines kept in the log console
    #[serde(default = "default_log_console_capacity")]
    pub log_console_capacity: usize,

    /// Maximum lines kept in the overview feed
    #[serde(default = "default_log_feed_capacity")]
    pub log_feed_capacity: usize,
}

fn default_status_revert_ms() -> u64 {
    2000
}

fn default_ai_error_revert_ms() -> u64 {
    3000
}

fn default_ai_success_hide_ms() -> u64 {
    4000
}

fn default_highlight_ms() -> u64 {
    3000
}

fn default_log_interval_ms() -> u64 {
    3000
}

fn default_log_console_capacity() -> usize {
    20
}

fn default_log_feed_capacity() -> usize {
    4
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            status_revert_ms: default_status_revert_ms(),
            ai_error_revert_ms: default_ai_error_revert_ms(),
            ai_success_hide_ms: default_ai_success_hide_ms(),
            highlight_ms: default_highlight_ms(),
            log_interval_ms: default_log_interval_ms(),
            log_console_capacity: default_log_console_capacity(),
            log_feed_capacity: default_log_feed_capacity(),
        }
    }
}

impl UiConfig {
    /// Status label revert delay
    pub fn status_revert(&self) -> Duration {
        Duration::from_millis(self.status_revert_ms)
    }

    /// AI failure restore delay
    pub fn ai_error_revert(&self) -> Duration {
        Duration::from_millis(self.ai_error_revert_ms)
    }

    /// AI success hide delay
    pub fn ai_success_hide(&self) -> Duration {
        Duration::from_millis(self.ai_success_hide_ms)
    }

    /// Field highlight duration
    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    /// Log ticker interval
    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Optional file receiving a copy of the log output
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "guild_dashboard=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    ///
    /// # Examples
    ///
    /// ```
    /// use guild_dashboard::config::Config;
    ///
    /// let config = Config::load("does-not-exist.yaml", &Default::default()).unwrap();
    /// assert_eq!(config.session.key, "prime_session_token");
    /// ```
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DashboardError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("GUILD_DASHBOARD_API_BASE") {
            tracing::debug!(base_url = %base_url, "Env override: GUILD_DASHBOARD_API_BASE");
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("GUILD_DASHBOARD_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid GUILD_DASHBOARD_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("GUILD_DASHBOARD_SESSION_BACKEND") {
            match backend.parse::<SessionBackend>() {
                Ok(value) => self.session.backend = value,
                Err(_) => tracing::warn!("Invalid session backend: {}, keeping configured", backend),
            }
        }

        if let Ok(session_file) = std::env::var("GUILD_DASHBOARD_SESSION_FILE") {
            self.session.file_path = Some(PathBuf::from(session_file));
        }

        if let Ok(level) = std::env::var("GUILD_DASHBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json_logs) = std::env::var("GUILD_DASHBOARD_JSON_LOGS") {
            match json_logs.parse::<bool>() {
                Ok(v) => self.logging.json_format = v,
                Err(_) => {
                    tracing::warn!("Invalid value for GUILD_DASHBOARD_JSON_LOGS: {}", json_logs)
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_base) = &cli.api_base {
            self.api.base_url = api_base.clone();
        }
        if cli.verbose {
            self.logging.level = "guild_dashboard=debug".to_string();
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse, or if any timeout,
    /// delay or capacity is zero
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(DashboardError::Config("api.base_url cannot be empty".to_string()).into());
        }

        url::Url::parse(&self.api.base_url).map_err(|e| {
            DashboardError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;

        if self.api.timeout_seconds == 0 {
            return Err(DashboardError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.key.is_empty() {
            return Err(DashboardError::Config("session.key cannot be empty".to_string()).into());
        }

        let delays = [
            ("ui.status_revert_ms", self.ui.status_revert_ms),
            ("ui.ai_error_revert_ms", self.ui.ai_error_revert_ms),
            ("ui.ai_success_hide_ms", self.ui.ai_success_hide_ms),
            ("ui.highlight_ms", self.ui.highlight_ms),
            ("ui.log_interval_ms", self.ui.log_interval_ms),
        ];
        for (name, value) in delays {
            if value == 0 {
                return Err(
                    DashboardError::Config(format!("{} must be greater than 0", name)).into(),
                );
            }
        }

        if self.ui.log_console_capacity == 0 || self.ui.log_feed_capacity == 0 {
            return Err(DashboardError::Config(
                "log console and feed capacities must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
