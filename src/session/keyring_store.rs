//! Session token persistence via OS keyring
//!
//! Stores the token in the operating system's native credential store
//! (Keychain on macOS, Secret Service on Linux, Windows Credential Manager
//! on Windows) under the service `guild-dashboard` and the configured key.

use crate::error::{DashboardError, Result};
use crate::session::SessionStore;

/// Keyring service name shared by every entry of this application
const SERVICE_NAME: &str = "guild-dashboard";

/// Stateless accessor for the OS native keyring
///
/// # Examples
///
/// ```no_run
/// use guild_dashboard::session::{KeyringSessionStore, SessionStore};
///
/// let store = KeyringSessionStore::new("prime_session_token");
/// store.save("token").unwrap();
/// assert_eq!(store.load().unwrap(), Some("token".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    key: String,
}

impl KeyringSessionStore {
    /// Create a store for the given entry key
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(SERVICE_NAME, &self.key).map_err(DashboardError::Keyring)?)
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(DashboardError::Keyring(e).into()),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .map_err(DashboardError::Keyring)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(DashboardError::Keyring(e).into()),
        }
    }
}
