//! Session token persistence
//!
//! The dashboard keeps exactly one persisted value: the opaque session token
//! issued by the backend. [`SessionStore`] abstracts where it lives:
//!
//! - [`KeyringSessionStore`] -- OS native credential store
//! - [`FileSessionStore`] -- JSON file under the user data directory
//! - [`MemorySessionStore`] -- process-local, used by tests and `--session memory`
//!
//! A stored token only means "possibly authenticated"; the controller always
//! confirms it against the identity endpoint before trusting it.

pub mod file_store;
pub mod keyring_store;

pub use file_store::FileSessionStore;
pub use keyring_store::KeyringSessionStore;

use std::sync::{Mutex, PoisonError};

use url::Url;

use crate::config::{SessionBackend, SessionConfig};
use crate::error::Result;

/// Query parameter carrying a freshly issued token on the login redirect
pub const REDIRECT_TOKEN_PARAM: &str = "session_token";

/// Storage for the session token
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Load the stored token, `None` when nothing is stored
    fn load(&self) -> Result<Option<String>>;

    /// Persist `token`, replacing any previous value
    fn save(&self, token: &str) -> Result<()>;

    /// Remove the stored token; removing a missing token is not an error
    fn clear(&self) -> Result<()>;
}

/// Process-local token storage
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Extract the session token from a login redirect URL
///
/// Returns `None` when the `session_token` parameter is absent or empty.
///
/// # Examples
///
/// ```
/// use guild_dashboard::session::token_from_redirect;
/// use url::Url;
///
/// let url = Url::parse("http://localhost:8000/dashboard?session_token=abc").unwrap();
/// assert_eq!(token_from_redirect(&url), Some("abc".to_string()));
///
/// let url = Url::parse("http://localhost:8000/dashboard").unwrap();
/// assert_eq!(token_from_redirect(&url), None);
/// ```
pub fn token_from_redirect(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == REDIRECT_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Build the session store selected by configuration
///
/// # Arguments
///
/// * `config` - Session section of the configuration
///
/// # Returns
///
/// Returns the boxed store for the configured backend
pub fn build_session_store(config: &SessionConfig) -> Box<dyn SessionStore> {
    match config.backend {
        SessionBackend::Keyring => {
            tracing::debug!("Using keyring session store");
            Box::new(KeyringSessionStore::new(&config.key))
        }
        SessionBackend::File => {
            let path = config.resolved_file_path();
            tracing::debug!("Using file session store at {}", path.display());
            Box::new(FileSessionStore::new(path, &config.key))
        }
        SessionBackend::Memory => {
            tracing::debug!("Using in-memory session store");
            Box::new(MemorySessionStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("tok").unwrap();
        assert_eq!(store.load().unwrap(), Some("tok".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_memory_store_clear_when_empty() {
        let store = MemorySessionStore::new();
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_token_from_redirect_decodes_value() {
        let url = Url::parse("http://x/dashboard?foo=1&session_token=a%2Bb").unwrap();
        assert_eq!(token_from_redirect(&url), Some("a+b".to_string()));
    }

    #[test]
    fn test_token_from_redirect_ignores_empty_value() {
        let url = Url::parse("http://x/dashboard?session_token=").unwrap();
        assert_eq!(token_from_redirect(&url), None);
    }

    #[test]
    fn test_build_memory_store() {
        let config = SessionConfig {
            backend: SessionBackend::Memory,
            ..Default::default()
        };
        let store = build_session_store(&config);
        store.save("x").unwrap();
        assert_eq!(store.load().unwrap(), Some("x".to_string()));
    }
}
