//! In-memory fake backend for tests and offline demos
//!
//! [`FakeDashboardApi`] implements [`DashboardApi`] without any network
//! I/O. Tests configure canned responses through the `set_*` methods and
//! inspect the traffic afterwards through [`FakeDashboardApi::calls`] and
//! [`FakeDashboardApi::saved_settings`].
//!
//! Every call is recorded as `"METHOD /path"` (for example
//! `"POST /api/guilds/1/ai-execute"`), which keeps assertions readable.
//!
//! # Example
//!
//! ```
//! use guild_dashboard::api::{DashboardApi, FakeDashboardApi, IdentityResponse};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let api = FakeDashboardApi::new();
//! api.set_identity("token", IdentityResponse { authenticated: true, ..Default::default() });
//!
//! let identity = api.me("token").await?;
//! assert!(identity.authenticated);
//! assert_eq!(api.calls(), vec!["GET /api/me".to_string()]);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{
    ActionStatus, AiPlanResponse, AuditResponse, DashboardApi, DashboardStats, GuildResource,
    IdentityResponse, PlanAction, RoleColorSuggestion, SettingsPayload,
};
use crate::error::{DashboardError, Result};

/// A canned failure returned by the fake backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeFailure {
    /// Respond with the given HTTP status
    Status(u16),
    /// Simulate a transport failure (connection refused, timeout)
    Network,
}

impl FakeFailure {
    fn into_error(self) -> anyhow::Error {
        match self {
            FakeFailure::Status(401) => DashboardError::Unauthorized.into(),
            FakeFailure::Status(status) => DashboardError::Api {
                status,
                message: String::new(),
            }
            .into(),
            FakeFailure::Network => anyhow::anyhow!("connection refused"),
        }
    }
}

pub type Reply<T> = std::result::Result<T, FakeFailure>;

#[derive(Debug, Default)]
struct FakeState {
    token: Option<String>,
    identity: Option<IdentityResponse>,
    stats: Option<Reply<DashboardStats>>,
    settings: HashMap<String, Reply<SettingsPayload>>,
    settings_delay: HashMap<String, Duration>,
    save_reply: Option<FakeFailure>,
    save_delay: Option<Duration>,
    saved: Vec<(String, SettingsPayload)>,
    roles: HashMap<String, Vec<GuildResource>>,
    channels: HashMap<String, Vec<GuildResource>>,
    invite_base: Option<String>,
    trigger_reply: Option<Reply<ActionStatus>>,
    plan_reply: Option<Reply<AiPlanResponse>>,
    execute_reply: Option<Reply<ActionStatus>>,
    suggest_reply: Option<Reply<AuditResponse>>,
    suggest_delay: Option<Duration>,
    executed_plans: Vec<Vec<PlanAction>>,
    color_updates: Vec<Vec<RoleColorSuggestion>>,
    calls: Vec<String>,
}

/// In-memory [`DashboardApi`] implementation
///
/// Unconfigured endpoints answer with HTTP 404, except `stats` and the
/// context lists which answer with empty data.
#[derive(Debug, Default)]
pub struct FakeDashboardApi {
    state: Mutex<FakeState>,
}

impl FakeDashboardApi {
    /// Create a fake backend with nothing configured
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }

    fn check_token(&self, token: &str) -> Result<()> {
        match self.lock().token.as_deref() {
            Some(expected) if expected == token => Ok(()),
            _ => Err(DashboardError::Unauthorized.into()),
        }
    }

    /// Accept `token` and answer `/api/me` with `identity`
    pub fn set_identity(&self, token: &str, identity: IdentityResponse) {
        let mut state = self.lock();
        state.token = Some(token.to_string());
        state.identity = Some(identity);
    }

    /// Answer `/api/dashboard/stats`
    pub fn set_stats(&self, reply: Reply<DashboardStats>) {
        self.lock().stats = Some(reply);
    }

    /// Answer `GET /api/guilds/{guild_id}/settings`
    pub fn set_settings(&self, guild_id: &str, reply: Reply<SettingsPayload>) {
        self.lock().settings.insert(guild_id.to_string(), reply);
    }

    /// Delay the settings response of one guild
    pub fn set_settings_delay(&self, guild_id: &str, delay: Duration) {
        self.lock()
            .settings_delay
            .insert(guild_id.to_string(), delay);
    }

    /// Make settings saves fail, or succeed again with `None`
    pub fn set_save_failure(&self, failure: Option<FakeFailure>) {
        self.lock().save_reply = failure;
    }

    /// Delay every settings save
    pub fn set_save_delay(&self, delay: Duration) {
        self.lock().save_delay = Some(delay);
    }

    /// Answer the role and channel lists of a guild
    pub fn set_context(
        &self,
        guild_id: &str,
        roles: Vec<GuildResource>,
        channels: Vec<GuildResource>,
    ) {
        let mut state = self.lock();
        state.roles.insert(guild_id.to_string(), roles);
        state.channels.insert(guild_id.to_string(), channels);
    }

    /// Answer invite lookups with `{base}?guild_id={id}`
    pub fn set_invite_base(&self, base: &str) {
        self.lock().invite_base = Some(base.to_string());
    }

    /// Answer `/trigger`
    pub fn set_trigger_reply(&self, reply: Reply<ActionStatus>) {
        self.lock().trigger_reply = Some(reply);
    }

    /// Answer `/ai-plan`
    pub fn set_plan_reply(&self, reply: Reply<AiPlanResponse>) {
        self.lock().plan_reply = Some(reply);
    }

    /// Answer `/ai-execute`
    pub fn set_execute_reply(&self, reply: Reply<ActionStatus>) {
        self.lock().execute_reply = Some(reply);
    }

    /// Answer `/ai-suggest`
    pub fn set_suggest_reply(&self, reply: Reply<AuditResponse>) {
        self.lock().suggest_reply = Some(reply);
    }

    /// Delay every `/ai-suggest` response
    pub fn set_suggest_delay(&self, delay: Duration) {
        self.lock().suggest_delay = Some(delay);
    }

    /// Every call received so far, as `"METHOD /path"`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls matching `call` exactly
    pub fn call_count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// Settings objects received by `POST /settings`, in arrival order
    pub fn saved_settings(&self) -> Vec<(String, SettingsPayload)> {
        self.lock().saved.clone()
    }

    /// Plans received by `/ai-execute`, in arrival order
    pub fn executed_plans(&self) -> Vec<Vec<PlanAction>> {
        self.lock().executed_plans.clone()
    }

    /// Color updates received by `/apply-suggestions`, in arrival order
    pub fn color_updates(&self) -> Vec<Vec<RoleColorSuggestion>> {
        self.lock().color_updates.clone()
    }
}

fn not_configured() -> anyhow::Error {
    FakeFailure::Status(404).into_error()
}

fn reply<T: Clone>(configured: Option<&Reply<T>>) -> Result<T> {
    match configured {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(failure)) => Err(failure.clone().into_error()),
        None => Err(not_configured()),
    }
}

#[async_trait]
impl DashboardApi for FakeDashboardApi {
    async fn me(&self, token: &str) -> Result<IdentityResponse> {
        self.record("GET /api/me".to_string());
        self.check_token(token)?;
        Ok(self.lock().identity.clone().unwrap_or_default())
    }

    async fn stats(&self, token: &str) -> Result<DashboardStats> {
        self.record("GET /api/dashboard/stats".to_string());
        self.check_token(token)?;
        let state = self.lock();
        match &state.stats {
            None => Ok(DashboardStats::default()),
            configured => reply(configured.as_ref()),
        }
    }

    async fn guild_settings(&self, token: &str, guild_id: &str) -> Result<SettingsPayload> {
        self.record(format!("GET /api/guilds/{}/settings", guild_id));
        self.check_token(token)?;
        let delay = self.lock().settings_delay.get(guild_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply(self.lock().settings.get(guild_id))
    }

    async fn save_guild_settings(
        &self,
        token: &str,
        guild_id: &str,
        settings: &SettingsPayload,
    ) -> Result<()> {
        self.record(format!("POST /api/guilds/{}/settings", guild_id));
        self.check_token(token)?;
        let delay = self.lock().save_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.lock();
        if let Some(failure) = state.save_reply.clone() {
            return Err(failure.into_error());
        }
        state.saved.push((guild_id.to_string(), settings.clone()));
        Ok(())
    }

    async fn guild_roles(&self, token: &str, guild_id: &str) -> Result<Vec<GuildResource>> {
        self.record(format!("GET /api/guilds/{}/roles", guild_id));
        self.check_token(token)?;
        Ok(self.lock().roles.get(guild_id).cloned().unwrap_or_default())
    }

    async fn guild_channels(&self, token: &str, guild_id: &str) -> Result<Vec<GuildResource>> {
        self.record(format!("GET /api/guilds/{}/channels", guild_id));
        self.check_token(token)?;
        Ok(self
            .lock()
            .channels
            .get(guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn invite_url(&self, guild_id: &str) -> Result<String> {
        self.record(format!("GET /api/invite-url?guild_id={}", guild_id));
        match &self.lock().invite_base {
            Some(base) => Ok(format!("{}?guild_id={}", base, guild_id)),
            None => Err(not_configured()),
        }
    }

    async fn trigger_action(
        &self,
        token: &str,
        guild_id: &str,
        _action: &str,
    ) -> Result<ActionStatus> {
        self.record(format!("POST /api/guilds/{}/trigger", guild_id));
        self.check_token(token)?;
        reply(self.lock().trigger_reply.as_ref())
    }

    async fn ai_plan(&self, token: &str, guild_id: &str, _prompt: &str) -> Result<AiPlanResponse> {
        self.record(format!("POST /api/guilds/{}/ai-plan", guild_id));
        self.check_token(token)?;
        reply(self.lock().plan_reply.as_ref())
    }

    async fn ai_execute(
        &self,
        token: &str,
        guild_id: &str,
        plan: &[PlanAction],
    ) -> Result<ActionStatus> {
        self.record(format!("POST /api/guilds/{}/ai-execute", guild_id));
        self.check_token(token)?;
        let mut state = self.lock();
        state.executed_plans.push(plan.to_vec());
        reply(state.execute_reply.as_ref())
    }

    async fn ai_suggest(&self, token: &str, guild_id: &str) -> Result<AuditResponse> {
        self.record(format!("POST /api/guilds/{}/ai-suggest", guild_id));
        self.check_token(token)?;
        let delay = self.lock().suggest_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply(self.lock().suggest_reply.as_ref())
    }

    async fn apply_suggestions(
        &self,
        token: &str,
        guild_id: &str,
        color_updates: &[RoleColorSuggestion],
    ) -> Result<()> {
        self.record(format!("POST /api/guilds/{}/apply-suggestions", guild_id));
        self.check_token(token)?;
        self.lock().color_updates.push(color_updates.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let api = FakeDashboardApi::new();
        api.set_identity("good", IdentityResponse::default());

        let err = api.me("bad").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_settings_answer_404() {
        let api = FakeDashboardApi::new();
        api.set_identity("t", IdentityResponse::default());

        let err = api.guild_settings("t", "1").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::Api { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let api = FakeDashboardApi::new();
        api.set_identity("t", IdentityResponse::default());

        let _ = api.me("t").await;
        let _ = api.stats("t").await;
        let _ = api.guild_roles("t", "9").await;

        assert_eq!(
            api.calls(),
            vec![
                "GET /api/me".to_string(),
                "GET /api/dashboard/stats".to_string(),
                "GET /api/guilds/9/roles".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_save_records_payload() {
        let api = FakeDashboardApi::new();
        api.set_identity("t", IdentityResponse::default());

        let mut payload = SettingsPayload::new();
        payload.insert("prefix".to_string(), serde_json::json!("?"));
        api.save_guild_settings("t", "1", &payload).await.unwrap();

        let saved = api.saved_settings();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "1");
        assert_eq!(saved[0].1["prefix"], "?");
    }

    #[tokio::test]
    async fn test_network_failure_is_not_a_dashboard_error() {
        let api = FakeDashboardApi::new();
        api.set_identity("t", IdentityResponse::default());
        api.set_plan_reply(Err(FakeFailure::Network));

        let err = api.ai_plan("t", "1", "a lobby").await.unwrap_err();
        assert!(err.downcast_ref::<DashboardError>().is_none());
    }
}
