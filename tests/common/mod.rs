use std::sync::Arc;

use guild_dashboard::api::{FakeDashboardApi, IdentityResponse};
use guild_dashboard::config::UiConfig;
use guild_dashboard::dashboard::{AuthState, DashboardClient};
use guild_dashboard::session::MemorySessionStore;

#[allow(dead_code)]
pub const TOKEN: &str = "integration-token";

/// Timings short enough to observe reverts within a test
#[allow(dead_code)]
pub fn fast_ui() -> UiConfig {
    UiConfig {
        status_revert_ms: 60,
        ai_error_revert_ms: 60,
        ai_success_hide_ms: 60,
        highlight_ms: 60,
        log_interval_ms: 25,
        ..Default::default()
    }
}

/// User `Prime` administering guild `10` (bot joined) and managing guild
/// `20` (bot missing); guild `30` is not manageable
#[allow(dead_code)]
pub fn identity() -> IdentityResponse {
    serde_json::from_value(serde_json::json!({
        "authenticated": true,
        "user": {"id": "1", "name": "Prime", "avatar": null},
        "guilds": [
            {"id": "10", "name": "Alpha", "icon": "a1", "permissions": 8, "bot_present": true},
            {"id": "20", "name": "Beta", "icon": null, "permissions": 32, "bot_present": false},
            {"id": "30", "name": "Gamma", "icon": null, "permissions": 0, "bot_present": true}
        ]
    }))
    .expect("valid identity")
}

/// A fake backend accepting [`TOKEN`] with [`identity`]
#[allow(dead_code)]
pub fn fake_api() -> Arc<FakeDashboardApi> {
    let api = Arc::new(FakeDashboardApi::new());
    api.set_identity(TOKEN, identity());
    api
}

/// A controller with [`TOKEN`] stored, not yet bootstrapped
#[allow(dead_code)]
pub fn client_for(api: &Arc<FakeDashboardApi>) -> DashboardClient {
    DashboardClient::new(
        api.clone(),
        Box::new(MemorySessionStore::with_token(TOKEN)),
        fast_ui(),
    )
}

/// A bootstrapped controller
#[allow(dead_code)]
pub async fn signed_in(api: &Arc<FakeDashboardApi>) -> DashboardClient {
    let client = client_for(api);
    assert_eq!(client.bootstrap(None).await, AuthState::Authenticated);
    client
}

/// A bootstrapped controller with guild `10` open
#[allow(dead_code)]
pub async fn configuring_alpha(api: &Arc<FakeDashboardApi>) -> DashboardClient {
    api.set_settings(
        "10",
        Ok(serde_json::json!({"prefix": "?", "vibe": "hype"})
            .as_object()
            .cloned()
            .unwrap_or_default()),
    );
    let client = signed_in(api).await;
    client.select_guild("10").await.expect("guild 10 is managed");
    client
}

/// Write `contents` to a `config.yaml` inside a fresh temporary directory
#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let temp_dir = tempfile::TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    std::fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
