//! Session bootstrap, guild listing and overview statistics

mod common;

use std::sync::Arc;

use guild_dashboard::api::fake::FakeFailure;
use guild_dashboard::api::{DashboardStats, FakeDashboardApi};
use guild_dashboard::dashboard::guilds::{TAG_ACTIVE, TAG_INVITE_REQUIRED};
use guild_dashboard::dashboard::{AuthState, DashboardClient, GuildListView, Selection, Tab};
use guild_dashboard::session::{FileSessionStore, MemorySessionStore, SessionStore};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> FileSessionStore {
    FileSessionStore::new(dir.path().join("session.json"), "prime_session_token")
}

#[tokio::test]
async fn test_no_token_boots_logged_out_without_requests() {
    let api = Arc::new(FakeDashboardApi::new());
    let client = DashboardClient::new(
        api.clone(),
        Box::new(MemorySessionStore::new()),
        common::fast_ui(),
    );

    assert_eq!(client.bootstrap(None).await, AuthState::LoggedOut);
    assert_eq!(client.view().auth, AuthState::LoggedOut);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_redirect_token_is_persisted_and_confirmed() {
    let dir = TempDir::new().unwrap();
    let api = common::fake_api();
    let client = DashboardClient::new(api.clone(), Box::new(file_store(&dir)), common::fast_ui());

    let redirect = url::Url::parse(&format!(
        "http://localhost:8000/?session_token={}",
        common::TOKEN
    ))
    .unwrap();
    assert_eq!(
        client.bootstrap_from_redirect(&redirect).await,
        AuthState::Authenticated
    );

    assert_eq!(
        file_store(&dir).load().unwrap().as_deref(),
        Some(common::TOKEN)
    );
    let view = client.view();
    assert_eq!(view.user_name.as_deref(), Some("Prime"));
    assert_eq!(
        view.avatar_url.as_deref(),
        Some("https://cdn.discordapp.com/embed/avatars/0.png")
    );
    assert_eq!(
        api.calls(),
        vec!["GET /api/me".to_string(), "GET /api/dashboard/stats".to_string()]
    );
}

#[tokio::test]
async fn test_rejected_token_is_cleared() {
    let dir = TempDir::new().unwrap();
    file_store(&dir).save("expired").unwrap();

    let api = common::fake_api();
    let client = DashboardClient::new(api.clone(), Box::new(file_store(&dir)), common::fast_ui());

    assert_eq!(client.bootstrap(None).await, AuthState::LoggedOut);
    assert!(file_store(&dir).load().unwrap().is_none());
    assert!(client.token().is_none());
    assert_eq!(api.call_count("GET /api/dashboard/stats"), 0);
}

#[tokio::test]
async fn test_guild_grid_lists_only_managed_guilds() {
    let api = common::fake_api();
    let client = common::signed_in(&api).await;

    let GuildListView::Cards(cards) = client.view().guilds else {
        panic!("expected guild cards");
    };
    let summary: Vec<(&str, &str)> = cards.iter().map(|c| (c.id.as_str(), c.tag())).collect();
    assert_eq!(summary, vec![("10", TAG_ACTIVE), ("20", TAG_INVITE_REQUIRED)]);
    assert_eq!(
        cards[0].icon_url,
        "https://cdn.discordapp.com/icons/10/a1.png"
    );
    assert_eq!(client.all_guilds().len(), 3);
}

#[tokio::test]
async fn test_no_managed_guilds_shows_empty_grid() {
    let api = Arc::new(FakeDashboardApi::new());
    let mut identity = common::identity();
    identity.guilds.retain(|g| g.id == "30");
    api.set_identity(common::TOKEN, identity);

    let client = common::signed_in(&api).await;
    assert_eq!(client.view().guilds, GuildListView::Empty);
}

#[tokio::test]
async fn test_invite_flow_for_guild_without_bot() {
    let api = common::fake_api();
    api.set_invite_base("https://discord.com/oauth2/authorize");
    let client = common::signed_in(&api).await;

    let selection = client.select_guild("20").await.unwrap();
    assert_eq!(
        selection,
        Selection::Invite(Some(
            "https://discord.com/oauth2/authorize?guild_id=20".to_string()
        ))
    );
    assert_eq!(
        client.view().invite_url.as_deref(),
        Some("https://discord.com/oauth2/authorize?guild_id=20")
    );
    assert_eq!(client.view().active_tab, Tab::Overview);
}

#[tokio::test]
async fn test_failed_invite_lookup_is_silent() {
    let api = common::fake_api();
    let client = common::signed_in(&api).await;

    assert_eq!(client.select_guild("20").await.unwrap(), Selection::Invite(None));
    assert!(client.take_alerts().is_empty());
}

#[tokio::test]
async fn test_stats_render_counts_and_leaderboard() {
    let api = common::fake_api();
    api.set_stats(Ok(DashboardStats {
        users: 1_520,
        messages: 2_400_000,
        leaderboard: None,
    }));
    let client = common::signed_in(&api).await;

    let stats = client.view().stats.expect("stats fetched during bootstrap");
    assert_eq!(stats.users, "1.5K");
    assert_eq!(stats.messages, "2.4M");
    assert_eq!(stats.leaderboard[0].name, "Prime");
}

#[tokio::test]
async fn test_stats_failure_leaves_panel_untouched() {
    let api = common::fake_api();
    api.set_stats(Err(FakeFailure::Status(500)));
    let client = common::signed_in(&api).await;

    assert!(client.view().stats.is_none());
    assert!(client.fetch_stats().await.is_none());
    assert!(client.take_alerts().is_empty());
}

#[tokio::test]
async fn test_logout_resets_user_state() {
    let api = common::fake_api();
    let client = common::configuring_alpha(&api).await;

    client.logout();

    let view = client.view();
    assert_eq!(view.auth, AuthState::LoggedOut);
    assert!(view.user_name.is_none());
    assert_eq!(view.guilds, GuildListView::NotLoaded);
    assert!(client.active_guild().is_none());
    assert!(client.token().is_none());
}
