//! Test utilities for the guild dashboard
//!
//! This module provides common test fixtures: temporary files, a fast UI
//! timing profile, a canned identity and a signed-in controller backed by
//! the in-memory fake API.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::api::{FakeDashboardApi, IdentityResponse};
use crate::config::UiConfig;
use crate::dashboard::{AuthState, DashboardClient};
use crate::session::MemorySessionStore;

/// Token accepted by [`signed_in_client`]
pub const TEST_TOKEN: &str = "test-session-token";

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error's message contains `expected`
///
/// # Panics
///
/// Panics if the result is `Ok` or the message does not match
pub fn assert_error_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}

/// UI timings short enough for real-time tests
pub fn fast_ui_config() -> UiConfig {
    UiConfig {
        status_revert_ms: 50,
        ai_error_revert_ms: 50,
        ai_success_hide_ms: 50,
        highlight_ms: 50,
        log_interval_ms: 20,
        ..Default::default()
    }
}

/// Identity of user `Prime` managing guild `10` (bot present) and `20`
/// (bot missing), plus an unmanaged guild `30`
pub fn identity_fixture() -> IdentityResponse {
    serde_json::from_value(serde_json::json!({
        "authenticated": true,
        "user": {"id": "1", "name": "Prime", "avatar": "abc"},
        "guilds": [
            {"id": "10", "name": "Alpha", "icon": null, "permissions": 8, "bot_present": true},
            {"id": "20", "name": "Beta", "icon": "i", "permissions": 32, "bot_present": false},
            {"id": "30", "name": "Gamma", "icon": null, "permissions": 0, "bot_present": true}
        ]
    }))
    .expect("identity fixture is valid")
}

/// A controller signed in as [`identity_fixture`] against a fake backend
pub async fn signed_in_client() -> (DashboardClient, Arc<FakeDashboardApi>) {
    let api = Arc::new(FakeDashboardApi::new());
    api.set_identity(TEST_TOKEN, identity_fixture());
    let client = DashboardClient::new(
        api.clone(),
        Box::new(MemorySessionStore::with_token(TEST_TOKEN)),
        fast_ui_config(),
    );
    assert_eq!(client.bootstrap(None).await, AuthState::Authenticated);
    (client, api)
}
