//! Per-guild settings form
//!
//! [`SettingKey`] enumerates every configuration key the backend stores for
//! a guild. [`SettingsForm`] is the editable copy shown in the customization
//! tab: it is filled from a settings response (missing or falsy values fall
//! back to the key's default) and flattened back into a single object on
//! save.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::SettingsPayload;
use crate::error::DashboardError;

/// Configuration keys of a guild, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    Prefix,
    Vibe,
    WelcomeChannel,
    LogChannel,
    RulesChannel,
    RoleRequestChannel,
    VerificationChannel,
    LevelingChannel,
    GeneralChannel,
    VerifiedRole,
    UnverifiedRole,
    MutedRole,
    AestheticOverlay,
    CustomSystemPrompt,
    RolesChannel,
}

impl SettingKey {
    /// Every key, in form order
    pub const ALL: [SettingKey; 15] = [
        SettingKey::Prefix,
        SettingKey::Vibe,
        SettingKey::WelcomeChannel,
        SettingKey::LogChannel,
        SettingKey::RulesChannel,
        SettingKey::RoleRequestChannel,
        SettingKey::VerificationChannel,
        SettingKey::LevelingChannel,
        SettingKey::GeneralChannel,
        SettingKey::VerifiedRole,
        SettingKey::UnverifiedRole,
        SettingKey::MutedRole,
        SettingKey::AestheticOverlay,
        SettingKey::CustomSystemPrompt,
        SettingKey::RolesChannel,
    ];

    /// Wire name of the key
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Prefix => "prefix",
            SettingKey::Vibe => "vibe",
            SettingKey::WelcomeChannel => "welcome_channel",
            SettingKey::LogChannel => "log_channel",
            SettingKey::RulesChannel => "rules_channel",
            SettingKey::RoleRequestChannel => "role_request_channel",
            SettingKey::VerificationChannel => "verification_channel",
            SettingKey::LevelingChannel => "leveling_channel",
            SettingKey::GeneralChannel => "general_channel",
            SettingKey::VerifiedRole => "verified_role",
            SettingKey::UnverifiedRole => "unverified_role",
            SettingKey::MutedRole => "muted_role",
            SettingKey::AestheticOverlay => "aesthetic_overlay",
            SettingKey::CustomSystemPrompt => "custom_system_prompt",
            SettingKey::RolesChannel => "roles_channel",
        }
    }

    /// Value shown when the backend has nothing for this key
    pub fn default_value(self) -> &'static str {
        match self {
            SettingKey::Prefix => "!",
            SettingKey::Vibe => "chill",
            _ => "",
        }
    }

    /// Whether an audit mapping may fill this key
    ///
    /// Channel and role references are linkable, except the role request
    /// channel.
    pub fn is_linkable(self) -> bool {
        matches!(
            self,
            SettingKey::WelcomeChannel
                | SettingKey::LogChannel
                | SettingKey::RulesChannel
                | SettingKey::RolesChannel
                | SettingKey::VerificationChannel
                | SettingKey::LevelingChannel
                | SettingKey::GeneralChannel
                | SettingKey::VerifiedRole
                | SettingKey::UnverifiedRole
                | SettingKey::MutedRole
        )
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DashboardError::Config(format!("Unknown setting key: {}", s)))
    }
}

/// Editable settings of the active guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsForm {
    values: BTreeMap<SettingKey, String>,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            values: SettingKey::ALL
                .into_iter()
                .map(|key| (key, key.default_value().to_string()))
                .collect(),
        }
    }
}

impl SettingsForm {
    /// Build a form from a settings response
    ///
    /// Absent, null, empty, zero or `false` values use the key's default.
    ///
    /// # Examples
    ///
    /// ```
    /// use guild_dashboard::dashboard::{SettingKey, SettingsForm};
    ///
    /// let payload = serde_json::json!({"vibe": "hype", "log_channel": 42});
    /// let form = SettingsForm::from_payload(payload.as_object().unwrap());
    ///
    /// assert_eq!(form.get(SettingKey::Prefix), "!");
    /// assert_eq!(form.get(SettingKey::Vibe), "hype");
    /// assert_eq!(form.get(SettingKey::LogChannel), "42");
    /// ```
    pub fn from_payload(payload: &SettingsPayload) -> Self {
        let mut form = Self::default();
        for key in SettingKey::ALL {
            if let Some(value) = payload.get(key.as_str()).and_then(truthy_string) {
                form.values.insert(key, value);
            }
        }
        form
    }

    /// Flatten the form into the object posted on save
    pub fn to_payload(&self) -> SettingsPayload {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), Value::String(value.clone())))
            .collect()
    }

    /// Current value of `key`
    pub fn get(&self, key: SettingKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or("")
    }

    /// Overwrite the value of `key`
    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// All keys with their values, in form order
    pub fn iter(&self) -> impl Iterator<Item = (SettingKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

fn truthy_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
