//! Wire types for the dashboard backend
//!
//! Every response type is lenient: missing fields fall back to their
//! defaults, and Discord snowflakes are accepted both as JSON strings and
//! as JSON numbers. Types that are sent back to the backend unmodified
//! (plan actions, role color suggestions) keep unknown fields in a
//! flattened map so the round trip is lossless.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Flat key/value settings object as exchanged with `/settings`
pub type SettingsPayload = serde_json::Map<String, serde_json::Value>;

/// Status string the backend uses for a successful operation
pub const STATUS_SUCCESS: &str = "success";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Response of `GET /api/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IdentityResponse {
    /// Whether the backend recognised the session token
    #[serde(default)]
    pub authenticated: bool,

    /// The logged-in user, present when authenticated
    #[serde(default)]
    pub user: Option<User>,

    /// Snapshot of every guild the user belongs to
    #[serde(default)]
    pub guilds: Vec<GuildSummary>,
}

/// The logged-in Discord user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Discord user id
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Avatar hash, if the user has a custom avatar
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A guild as listed by the identity endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildSummary {
    /// Discord guild id
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Guild name
    #[serde(default)]
    pub name: String,

    /// Icon hash, if the guild has an icon
    #[serde(default)]
    pub icon: Option<String>,

    /// The user's permission bitmask in this guild
    #[serde(default, deserialize_with = "bitmask")]
    pub permissions: u64,

    /// Whether the bot has already joined this guild
    #[serde(default)]
    pub bot_present: bool,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Response of `GET /api/dashboard/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    /// Number of users known to the bot
    #[serde(default)]
    pub users: u64,

    /// Number of messages processed
    #[serde(default)]
    pub messages: u64,

    /// Top users by XP, when the backend provides them
    #[serde(default)]
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
}

/// One leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Discord user id
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Username, when known
    #[serde(default)]
    pub username: Option<String>,

    /// Current level
    #[serde(default)]
    pub level: u32,

    /// Accumulated experience points
    #[serde(default)]
    pub xp: u64,
}

// ---------------------------------------------------------------------------
// Guild context
// ---------------------------------------------------------------------------

/// A role or channel of a guild
///
/// Only `id` and `name` are interpreted; everything else the backend
/// returns is preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuildResource {
    /// Discord snowflake
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Remaining fields, passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `GET /api/invite-url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteResponse {
    /// Bot invite URL for the guild
    pub url: String,
}

// ---------------------------------------------------------------------------
// Actions and AI flows
// ---------------------------------------------------------------------------

/// Generic `{status, error?}` response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionStatus {
    /// `"success"` or a backend-specific failure status
    #[serde(default)]
    pub status: String,

    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionStatus {
    /// Whether the backend reported success
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// One step of an AI-generated plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanAction {
    /// Action kind, e.g. `create_channel` or `create_role`
    pub action: String,

    /// Name of the channel or role to create
    #[serde(default)]
    pub name: String,

    /// Channel type (`text`, `voice`, `category`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Display color for the preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Display icon for the preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `POST /api/guilds/{id}/ai-plan`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AiPlanResponse {
    /// `"success"` on success
    #[serde(default)]
    pub status: String,

    /// Ordered list of proposed actions
    #[serde(default)]
    pub plan: Option<Vec<PlanAction>>,

    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /api/guilds/{id}/ai-suggest`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditResponse {
    /// `"success"` on success
    #[serde(default)]
    pub status: String,

    /// The audit result
    #[serde(default)]
    pub suggestions: Option<Suggestions>,

    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of an AI audit of a guild
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Suggestions {
    /// Free-text explanation from the auditor
    #[serde(default)]
    pub reasoning: String,

    /// Setting key to suggested existing channel or role id
    #[serde(default)]
    pub mappings: BTreeMap<String, serde_json::Value>,

    /// Slots that have no matching resource in the guild
    #[serde(default)]
    pub creation_suggestions: Vec<CreationSuggestion>,

    /// Suggested role colors
    #[serde(default)]
    pub role_color_suggestions: Vec<RoleColorSuggestion>,
}

/// A configuration slot the auditor could not fill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreationSuggestion {
    /// Setting key the resource would fill
    pub key: String,

    /// Suggested name for the missing resource
    #[serde(default)]
    pub recommended_name: String,

    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A suggested role color change
///
/// Sent back verbatim as part of `apply-suggestions`, so unknown fields
/// (role id, current color) survive in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleColorSuggestion {
    /// Suggested color, e.g. `#ffaa00`
    #[serde(default)]
    pub suggested_color: String,

    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Converts a mapping value into a reference id, skipping empty values
///
/// `null`, `false`, empty strings and zero are treated as "no suggestion".
pub fn mapping_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/guilds/{id}/ai-plan`
#[derive(Debug, Serialize)]
pub(crate) struct PlanRequest<'a> {
    pub prompt: &'a str,
}

/// Body of `POST /api/guilds/{id}/ai-execute`
#[derive(Debug, Serialize)]
pub(crate) struct ExecuteRequest<'a> {
    pub plan: &'a [PlanAction],
}

/// Body of `POST /api/guilds/{id}/trigger`
#[derive(Debug, Serialize)]
pub(crate) struct TriggerRequest<'a> {
    pub action: &'a str,
}

/// Body of `POST /api/guilds/{id}/apply-suggestions`
#[derive(Debug, Serialize)]
pub(crate) struct ApplySuggestionsRequest<'a> {
    pub color_updates: &'a [RoleColorSuggestion],
}

// ---------------------------------------------------------------------------
// Lenient deserializers
// ---------------------------------------------------------------------------

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

fn bitmask<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    // A malformed bitmask grants nothing
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_parses_numeric_and_string_ids() {
        let identity: IdentityResponse = serde_json::from_value(json!({
            "authenticated": true,
            "user": {"id": 42, "name": "Ada", "avatar": null},
            "guilds": [
                {"id": "1", "name": "Test", "icon": null, "permissions": "40", "bot_present": true},
                {"id": 2, "name": "Other", "permissions": 8}
            ]
        }))
        .unwrap();

        let user = identity.user.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(identity.guilds[0].permissions, 40);
        assert_eq!(identity.guilds[1].id, "2");
        assert!(!identity.guilds[1].bot_present);
    }

    #[test]
    fn test_unauthenticated_identity_defaults() {
        let identity: IdentityResponse =
            serde_json::from_value(json!({"authenticated": false})).unwrap();
        assert!(!identity.authenticated);
        assert!(identity.user.is_none());
        assert!(identity.guilds.is_empty());
    }

    #[test]
    fn test_malformed_permissions_grant_nothing() {
        let identity: IdentityResponse = serde_json::from_value(json!({
            "authenticated": true,
            "user": {"id": "1", "name": "Prime"},
            "guilds": [
                {"id": "10", "permissions": -1},
                {"id": "20", "permissions": "lots"},
                {"id": "30", "permissions": "8"}
            ]
        }))
        .unwrap();
        let permissions: Vec<u64> = identity.guilds.iter().map(|g| g.permissions).collect();
        assert_eq!(permissions, vec![0, 0, 8]);
    }

    #[test]
    fn test_audit_survives_color_suggestion_without_color() {
        let response: AuditResponse = serde_json::from_value(json!({
            "status": "success",
            "suggestions": {
                "role_color_suggestions": [
                    {"role_id": "9"},
                    {"role_id": "10", "suggested_color": "#ffaa00"}
                ]
            }
        }))
        .unwrap();
        let colors = response.suggestions.unwrap().role_color_suggestions;
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].suggested_color, "");
        assert_eq!(colors[1].suggested_color, "#ffaa00");
    }

    #[test]
    fn test_plan_action_preserves_unknown_fields() {
        let value = json!({
            "action": "create_channel",
            "name": "general",
            "type": "text",
            "category": "Lobby"
        });
        let action: PlanAction = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(action.kind.as_deref(), Some("text"));
        assert_eq!(serde_json::to_value(&action).unwrap(), value);
    }

    #[test]
    fn test_role_color_suggestion_serializes_verbatim() {
        let value = json!({"role_id": "77", "suggested_color": "#ffaa00"});
        let suggestion: RoleColorSuggestion = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&suggestion).unwrap(), value);
    }

    #[test]
    fn test_mapping_id_skips_empty_values() {
        assert_eq!(mapping_id(&json!("123")), Some("123".to_string()));
        assert_eq!(mapping_id(&json!(123)), Some("123".to_string()));
        assert_eq!(mapping_id(&json!("")), None);
        assert_eq!(mapping_id(&json!(null)), None);
        assert_eq!(mapping_id(&json!(0)), None);
        assert_eq!(mapping_id(&json!(false)), None);
    }

    #[test]
    fn test_action_status_success() {
        let ok: ActionStatus = serde_json::from_value(json!({"status": "success"})).unwrap();
        assert!(ok.is_success());
        let failed: ActionStatus =
            serde_json::from_value(json!({"status": "error", "error": "nope"})).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_stats_without_leaderboard() {
        let stats: DashboardStats = serde_json::from_value(json!({"users": 5})).unwrap();
        assert_eq!(stats.users, 5);
        assert_eq!(stats.messages, 0);
        assert!(stats.leaderboard.is_none());
    }
}
