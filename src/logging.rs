//! Logging setup
//!
//! Provides JSON-formatted and human-readable logging with optional file
//! output. Console logs go to stderr so command output on stdout stays
//! machine-readable.

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize logging based on configuration.
///
/// `RUST_LOG` takes precedence over `config.level`.
///
/// # Arguments
///
/// * `config` - Logging configuration
///
/// # Returns
///
/// Returns success or error if the filter is invalid, the log file cannot be
/// opened, or a global subscriber is already installed
///
/// # Examples
///
/// ```no_run
/// use guild_dashboard::config::LoggingConfig;
/// use guild_dashboard::logging::init_logging;
///
/// let config = LoggingConfig {
///     level: "guild_dashboard=info".to_string(),
///     json_format: true,
///     file_path: None,
/// };
///
/// let result = init_logging(&config);
/// assert!(result.is_ok());
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let file = match &config.file_path {
        Some(path) => Some(Arc::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    if config.json_format {
        let stderr_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);

        if let Some(file) = file {
            let file_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(file);
            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    } else {
        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr);

        if let Some(file) = file {
            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_writer(file);
            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_log_file_is_an_error() {
        let config = LoggingConfig {
            level: "info".to_string(),
            json_format: false,
            file_path: Some("/nonexistent-dir/for/sure/log.txt".into()),
        };
        assert!(init_logging(&config).is_err());
    }
}
