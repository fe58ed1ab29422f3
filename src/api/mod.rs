//! Dashboard backend API abstraction and implementations
//!
//! This module defines the [`DashboardApi`] trait, one async method per
//! backend endpoint. Concrete implementations live in submodules:
//!
//! - [`http::HttpDashboardApi`] -- talks to the real backend over HTTP.
//! - [`fake::FakeDashboardApi`] -- in-memory backend used by tests and
//!   offline demos.
//!
//! # Error contract
//!
//! Implementations return [`DashboardError::Unauthorized`] for HTTP 401,
//! [`DashboardError::Api`] for any other non-success status, and transport
//! or decode failures as-is. A 2xx response whose body carries
//! `status != "success"` is *not* an error at this layer; the controller
//! decides how to surface it.
//!
//! [`DashboardError::Unauthorized`]: crate::error::DashboardError::Unauthorized
//! [`DashboardError::Api`]: crate::error::DashboardError::Api

pub mod fake;
pub mod http;
pub mod types;

pub use fake::FakeDashboardApi;
pub use http::HttpDashboardApi;
pub use types::{
    mapping_id, ActionStatus, AiPlanResponse, AuditResponse, CreationSuggestion, DashboardStats,
    GuildResource, GuildSummary, IdentityResponse, InviteResponse, LeaderboardEntry, PlanAction,
    RoleColorSuggestion, SettingsPayload, Suggestions, User, STATUS_SUCCESS,
};

use crate::error::Result;

/// Header carrying the session token on every authenticated request
pub const SESSION_HEADER: &str = "X-Session-Token";

/// Abstraction over the dashboard backend.
///
/// Every method that acts on behalf of the user takes the opaque session
/// token; the invite lookup is public and does not.
///
/// # Examples
///
/// ```
/// use guild_dashboard::api::{DashboardApi, FakeDashboardApi};
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let api = FakeDashboardApi::new();
/// let identity = api.me("unknown-token").await;
/// assert!(identity.is_err());
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/me`
    async fn me(&self, token: &str) -> Result<IdentityResponse>;

    /// `GET /api/dashboard/stats`
    async fn stats(&self, token: &str) -> Result<DashboardStats>;

    /// `GET /api/guilds/{id}/settings`
    async fn guild_settings(&self, token: &str, guild_id: &str) -> Result<SettingsPayload>;

    /// `POST /api/guilds/{id}/settings`
    async fn save_guild_settings(
        &self,
        token: &str,
        guild_id: &str,
        settings: &SettingsPayload,
    ) -> Result<()>;

    /// `GET /api/guilds/{id}/roles`
    async fn guild_roles(&self, token: &str, guild_id: &str) -> Result<Vec<GuildResource>>;

    /// `GET /api/guilds/{id}/channels`
    async fn guild_channels(&self, token: &str, guild_id: &str) -> Result<Vec<GuildResource>>;

    /// `GET /api/invite-url?guild_id=`
    async fn invite_url(&self, guild_id: &str) -> Result<String>;

    /// `POST /api/guilds/{id}/trigger`
    async fn trigger_action(&self, token: &str, guild_id: &str, action: &str)
        -> Result<ActionStatus>;

    /// `POST /api/guilds/{id}/ai-plan`
    async fn ai_plan(&self, token: &str, guild_id: &str, prompt: &str) -> Result<AiPlanResponse>;

    /// `POST /api/guilds/{id}/ai-execute`
    async fn ai_execute(
        &self,
        token: &str,
        guild_id: &str,
        plan: &[PlanAction],
    ) -> Result<ActionStatus>;

    /// `POST /api/guilds/{id}/ai-suggest`
    async fn ai_suggest(&self, token: &str, guild_id: &str) -> Result<AuditResponse>;

    /// `POST /api/guilds/{id}/apply-suggestions`
    async fn apply_suggestions(
        &self,
        token: &str,
        guild_id: &str,
        color_updates: &[RoleColorSuggestion],
    ) -> Result<()>;
}
