//! HTTP implementation of the dashboard backend API
//!
//! Wraps a `reqwest` client and a base URL. Every request carries the
//! session token in the [`SESSION_HEADER`] header; responses are checked
//! for 401 and other non-success statuses before their JSON body is decoded.

use crate::api::types::{
    ApplySuggestionsRequest, ExecuteRequest, InviteResponse, PlanRequest, TriggerRequest,
};
use crate::api::{
    ActionStatus, AiPlanResponse, AuditResponse, DashboardApi, DashboardStats, GuildResource,
    IdentityResponse, PlanAction, RoleColorSuggestion, SettingsPayload, SESSION_HEADER,
};
use crate::config::ApiConfig;
use crate::error::{DashboardError, Result};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Dashboard backend reached over HTTP
///
/// # Examples
///
/// ```
/// use guild_dashboard::api::HttpDashboardApi;
/// use guild_dashboard::config::ApiConfig;
///
/// let api = HttpDashboardApi::new(&ApiConfig::default()).unwrap();
/// assert_eq!(api.base_url().as_str(), "http://localhost:8000/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: Client,
    base_url: Url,
}

impl HttpDashboardApi {
    /// Create a new HTTP API client
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "API base URL cannot carry paths: {}",
                config.base_url
            ))
            .into());
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized dashboard API client: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// The backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL below the base URL from raw path segments
    ///
    /// Segments are percent-encoded individually, so a guild id can never
    /// escape its path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DashboardError::Config(format!("API base URL cannot carry paths: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn guild_endpoint(&self, guild_id: &str, leaf: &str) -> Result<Url> {
        self.endpoint(&["api", "guilds", guild_id, leaf])
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header(SESSION_HEADER, token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, token: Option<&str>) -> Result<T> {
        tracing::debug!("GET {}", url);
        let mut builder = self.client.get(url);
        if let Some(token) = token {
            builder = self.authed(builder, token);
        }
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B, T>(&self, url: Url, token: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(url, token, body).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post<B>(&self, url: Url, token: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!("POST {}", url);
        let mut builder = self.authed(self.client.post(url), token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        check_status(builder.send().await?).await
    }
}

/// Map 401 and other non-success statuses to [`DashboardError`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        tracing::debug!("Backend rejected session token");
        return Err(DashboardError::Unauthorized.into());
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        tracing::debug!("Backend returned error {}: {}", status, message);
        return Err(DashboardError::Api {
            status: status.as_u16(),
            message,
        }
        .into());
    }
    Ok(response)
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn me(&self, token: &str) -> Result<IdentityResponse> {
        let url = self.endpoint(&["api", "me"])?;
        self.get_json(url, Some(token)).await
    }

    async fn stats(&self, token: &str) -> Result<DashboardStats> {
        let url = self.endpoint(&["api", "dashboard", "stats"])?;
        self.get_json(url, Some(token)).await
    }

    async fn guild_settings(&self, token: &str, guild_id: &str) -> Result<SettingsPayload> {
        let url = self.guild_endpoint(guild_id, "settings")?;
        self.get_json(url, Some(token)).await
    }

    async fn save_guild_settings(
        &self,
        token: &str,
        guild_id: &str,
        settings: &SettingsPayload,
    ) -> Result<()> {
        let url = self.guild_endpoint(guild_id, "settings")?;
        self.post(url, token, Some(settings)).await?;
        Ok(())
    }

    async fn guild_roles(&self, token: &str, guild_id: &str) -> Result<Vec<GuildResource>> {
        let url = self.guild_endpoint(guild_id, "roles")?;
        self.get_json(url, Some(token)).await
    }

    async fn guild_channels(&self, token: &str, guild_id: &str) -> Result<Vec<GuildResource>> {
        let url = self.guild_endpoint(guild_id, "channels")?;
        self.get_json(url, Some(token)).await
    }

    async fn invite_url(&self, guild_id: &str) -> Result<String> {
        let mut url = self.endpoint(&["api", "invite-url"])?;
        url.query_pairs_mut().append_pair("guild_id", guild_id);
        let invite: InviteResponse = self.get_json(url, None).await?;
        Ok(invite.url)
    }

    async fn trigger_action(
        &self,
        token: &str,
        guild_id: &str,
        action: &str,
    ) -> Result<ActionStatus> {
        let url = self.guild_endpoint(guild_id, "trigger")?;
        self.post_json(url, token, Some(&TriggerRequest { action }))
            .await
    }

    async fn ai_plan(&self, token: &str, guild_id: &str, prompt: &str) -> Result<AiPlanResponse> {
        let url = self.guild_endpoint(guild_id, "ai-plan")?;
        self.post_json(url, token, Some(&PlanRequest { prompt }))
            .await
    }

    async fn ai_execute(
        &self,
        token: &str,
        guild_id: &str,
        plan: &[PlanAction],
    ) -> Result<ActionStatus> {
        let url = self.guild_endpoint(guild_id, "ai-execute")?;
        self.post_json(url, token, Some(&ExecuteRequest { plan }))
            .await
    }

    async fn ai_suggest(&self, token: &str, guild_id: &str) -> Result<AuditResponse> {
        let url = self.guild_endpoint(guild_id, "ai-suggest")?;
        self.post_json::<(), _>(url, token, None).await
    }

    async fn apply_suggestions(
        &self,
        token: &str,
        guild_id: &str,
        color_updates: &[RoleColorSuggestion],
    ) -> Result<()> {
        let url = self.guild_endpoint(guild_id, "apply-suggestions")?;
        self.post(url, token, Some(&ApplySuggestionsRequest { color_updates }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_with_base(base: &str) -> HttpDashboardApi {
        let config = ApiConfig {
            base_url: base.to_string(),
            ..Default::default()
        };
        HttpDashboardApi::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_below_root() {
        let api = api_with_base("http://localhost:8000");
        let url = api.endpoint(&["api", "me"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/me");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let api = api_with_base("https://example.com/dashboard/");
        let url = api.guild_endpoint("123", "settings").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/dashboard/api/guilds/123/settings"
        );
    }

    #[test]
    fn test_guild_id_is_percent_encoded() {
        let api = api_with_base("http://localhost:8000");
        let url = api.guild_endpoint("a/b", "roles").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/guilds/a%2Fb/roles");
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(HttpDashboardApi::new(&config).is_err());
    }

    #[test]
    fn test_new_rejects_cannot_be_a_base_url() {
        let config = ApiConfig {
            base_url: "mailto:admin@example.com".to_string(),
            ..Default::default()
        };
        assert!(HttpDashboardApi::new(&config).is_err());
    }
}
