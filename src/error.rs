//! Error types for the guild dashboard
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for dashboard operations
///
/// Covers configuration loading, remote API failures, session storage,
/// and the guard conditions of the user-initiated flows (no selected
/// guild, empty prompt, save already running).
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered with a non-success HTTP status
    #[error("HTTP Error: {status}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The backend rejected the session token (HTTP 401)
    #[error("Unauthorized: Please log in again.")]
    Unauthorized,

    /// The backend answered 2xx but reported `status != "success"`
    #[error("{0}")]
    Rejected(String),

    /// An operation that needs a selected guild was invoked without one
    #[error("PROTOCOL DENIED: {0}")]
    NoActiveGuild(String),

    /// The AI architect was asked to plan with an empty description
    #[error("Please describe your server architecture first.")]
    EmptyPrompt,

    /// The form does not hold the settings of the guild being saved
    #[error("PROTOCOL DENIED: Settings of server {0} are not loaded.")]
    SettingsNotLoaded(String),

    /// A settings save is already in flight
    #[error("A settings save is already in progress")]
    SaveInProgress,

    /// The requested guild is not part of the current identity snapshot
    #[error("Unknown guild: {0}")]
    UnknownGuild(String),

    /// The request belonged to a guild selection that has been superseded
    #[error("Selection for guild {0} was superseded")]
    SelectionSuperseded(String),

    /// No session token is held, or the backend does not recognise it
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Session storage errors (file backend)
    #[error("Session storage error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for dashboard operations
///
/// Uses `anyhow::Error` so call sites can attach context while the
/// underlying [`DashboardError`] stays reachable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = DashboardError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_api_error_display_uses_status_code() {
        let error = DashboardError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP Error: 502");
    }

    #[test]
    fn test_unauthorized_display() {
        assert_eq!(
            DashboardError::Unauthorized.to_string(),
            "Unauthorized: Please log in again."
        );
    }

    #[test]
    fn test_rejected_display_is_verbatim() {
        let error = DashboardError::Rejected("Brainstorm failed".to_string());
        assert_eq!(error.to_string(), "Brainstorm failed");
    }

    #[test]
    fn test_no_active_guild_display() {
        let error = DashboardError::NoActiveGuild("select a server".to_string());
        assert_eq!(error.to_string(), "PROTOCOL DENIED: select a server");
    }

    #[test]
    fn test_settings_not_loaded_display() {
        let error = DashboardError::SettingsNotLoaded("40".to_string());
        assert_eq!(
            error.to_string(),
            "PROTOCOL DENIED: Settings of server 40 are not loaded."
        );
    }

    #[test]
    fn test_empty_prompt_display() {
        assert_eq!(
            DashboardError::EmptyPrompt.to_string(),
            "Please describe your server architecture first."
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: DashboardError = io_error.into();
        assert!(matches!(error, DashboardError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: DashboardError = json_error.into();
        assert!(matches!(error, DashboardError::Serialization(_)));
    }

    #[test]
    fn test_url_error_conversion() {
        let url_error = url::Url::parse("not a url").unwrap_err();
        let error: DashboardError = url_error.into();
        assert!(matches!(error, DashboardError::Url(_)));
    }

    #[test]
    fn test_error_downcasts_through_anyhow() {
        let result: Result<()> = Err(DashboardError::SaveInProgress.into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::SaveInProgress)
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DashboardError>();
    }
}
