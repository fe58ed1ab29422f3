//! AI architect plan preview and audit suggestions
//!
//! Pure derivations used by the controller: a plan becomes preview
//! entries, an audit result becomes the suggestion list, and applying an
//! audit fills the linkable settings fields.

use std::fmt;

use serde::Serialize;

use crate::api::{mapping_id, PlanAction, Suggestions};
use crate::dashboard::settings::{SettingKey, SettingsForm};

/// Icon shown for plan actions that carry none
pub const DEFAULT_PLAN_ICON: &str = "🛠️";

/// Header of the creation suggestions section
pub const MISSING_INFRASTRUCTURE: &str = "MISSING INFRASTRUCTURE";

/// Header of the role color section
pub const AESTHETIC_UPGRADES: &str = "AESTHETIC UPGRADES";

/// One line of the plan review panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub icon: String,
    /// Action kind without its `create_` prefix
    pub label: String,
    pub color: Option<String>,
    pub name: String,
    pub kind: Option<String>,
}

impl PlanEntry {
    /// Derive the preview line of a plan action
    ///
    /// # Examples
    ///
    /// ```
    /// use guild_dashboard::api::PlanAction;
    /// use guild_dashboard::dashboard::ai::PlanEntry;
    ///
    /// let action: PlanAction = serde_json::from_value(serde_json::json!({
    ///     "action": "create_channel", "name": "general", "type": "text"
    /// })).unwrap();
    ///
    /// let entry = PlanEntry::from_action(&action);
    /// assert_eq!(entry.label, "channel");
    /// assert_eq!(entry.to_string(), "🛠️ channel general (text)");
    /// ```
    pub fn from_action(action: &PlanAction) -> Self {
        Self {
            icon: action
                .icon
                .clone()
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| DEFAULT_PLAN_ICON.to_string()),
            label: action.action.replacen("create_", "", 1),
            color: action.color.clone().filter(|c| !c.is_empty()),
            name: action.name.clone(),
            kind: action.kind.clone().filter(|k| !k.is_empty()),
        }
    }
}

impl fmt::Display for PlanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.icon, self.label, self.name)?;
        if let Some(kind) = &self.kind {
            write!(f, " ({})", kind)?;
        }
        Ok(())
    }
}

/// Preview lines of a whole plan, one per action
pub fn plan_entries(plan: &[PlanAction]) -> Vec<PlanEntry> {
    plan.iter().map(PlanEntry::from_action).collect()
}

/// Human label of a setting key as the auditor names it
fn key_label(key: &str) -> String {
    key.replacen('_', " ", 1)
}

/// One line of the suggestion modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionEntry {
    /// An existing resource mapped to a setting
    Link { key: String, label: String, id: String },
    /// Section header
    Section { title: String },
    /// A setting with no matching resource
    Missing { key: String, label: String, recommended_name: String },
    /// A suggested role color
    RoleColor { color: String },
}

impl fmt::Display for SuggestionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionEntry::Link { label, id, .. } => {
                write!(f, "{} Linked to ID: {}", label, id)
            }
            SuggestionEntry::Section { title } => f.write_str(title),
            SuggestionEntry::Missing {
                label,
                recommended_name,
                ..
            } => write!(
                f,
                "{} MISSING: Suggest creating \"{}\"",
                label, recommended_name
            ),
            SuggestionEntry::RoleColor { color } => write!(f, "ROLE COLOR {} (Suggested)", color),
        }
    }
}

/// Build the suggestion list of an audit result
///
/// Empty mappings are skipped; the creation and color sections only appear
/// when they have entries.
pub fn suggestion_entries(suggestions: &Suggestions) -> Vec<SuggestionEntry> {
    let mut entries: Vec<SuggestionEntry> = suggestions
        .mappings
        .iter()
        .filter_map(|(key, value)| {
            mapping_id(value).map(|id| SuggestionEntry::Link {
                key: key.clone(),
                label: key_label(key),
                id,
            })
        })
        .collect();

    if !suggestions.creation_suggestions.is_empty() {
        entries.push(SuggestionEntry::Section {
            title: MISSING_INFRASTRUCTURE.to_string(),
        });
        entries.extend(
            suggestions
                .creation_suggestions
                .iter()
                .map(|s| SuggestionEntry::Missing {
                    key: s.key.clone(),
                    label: key_label(&s.key),
                    recommended_name: s.recommended_name.clone(),
                }),
        );
    }

    if !suggestions.role_color_suggestions.is_empty() {
        entries.push(SuggestionEntry::Section {
            title: AESTHETIC_UPGRADES.to_string(),
        });
        entries.extend(
            suggestions
                .role_color_suggestions
                .iter()
                .map(|c| SuggestionEntry::RoleColor {
                    color: c.suggested_color.clone(),
                }),
        );
    }

    entries
}

/// Write every linkable, non-empty mapping into `form`
///
/// Returns the keys that were set, in mapping order.
pub fn apply_mappings(suggestions: &Suggestions, form: &mut SettingsForm) -> Vec<SettingKey> {
    let mut applied = Vec::new();
    for (key, value) in &suggestions.mappings {
        let Ok(setting) = key.parse::<SettingKey>() else {
            continue;
        };
        if !setting.is_linkable() {
            continue;
        }
        if let Some(id) = mapping_id(value) {
            form.set(setting, id);
            applied.push(setting);
        }
    }
    applied
}

/// Notice shown after applying suggestions
pub fn applied_notice(count: usize) -> String {
    format!(
        "Applied {} configurations. Any role color updates are being processed in the background. Click SYNC ALL CHANGES to save.",
        count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn suggestions(value: serde_json::Value) -> Suggestions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plan_entry_defaults() {
        let action: PlanAction =
            serde_json::from_value(json!({"action": "create_role", "name": "Mods"})).unwrap();
        let entry = PlanEntry::from_action(&action);
        assert_eq!(entry.icon, DEFAULT_PLAN_ICON);
        assert_eq!(entry.label, "role");
        assert_eq!(entry.kind, None);
        assert_eq!(entry.to_string(), "🛠️ role Mods");
    }

    #[test]
    fn test_plan_entry_strips_only_first_prefix() {
        let action: PlanAction = serde_json::from_value(
            json!({"action": "create_create_channel", "name": "x", "icon": "📢"}),
        )
        .unwrap();
        let entry = PlanEntry::from_action(&action);
        assert_eq!(entry.label, "create_channel");
        assert_eq!(entry.icon, "📢");
    }

    #[test]
    fn test_suggestion_entries_sections() {
        let s = suggestions(json!({
            "reasoning": "r",
            "mappings": {"welcome_channel": "1", "log_channel": null, "muted_role": ""},
            "creation_suggestions": [{"key": "rules_channel", "recommended_name": "rules"}],
            "role_color_suggestions": [{"role_id": "9", "suggested_color": "#fff"}]
        }));
        let entries = suggestion_entries(&s);

        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].to_string(), "welcome channel Linked to ID: 1");
        assert_eq!(entries[1].to_string(), MISSING_INFRASTRUCTURE);
        assert_eq!(
            entries[2].to_string(),
            "rules channel MISSING: Suggest creating \"rules\""
        );
        assert_eq!(entries[3].to_string(), AESTHETIC_UPGRADES);
        assert_eq!(entries[4].to_string(), "ROLE COLOR #fff (Suggested)");
    }

    #[test]
    fn test_apply_single_mapping() {
        let s = suggestions(json!({"mappings": {"welcome_channel": "123"}}));
        let mut form = SettingsForm::default();
        let applied = apply_mappings(&s, &mut form);

        assert_eq!(applied, vec![SettingKey::WelcomeChannel]);
        assert_eq!(form.get(SettingKey::WelcomeChannel), "123");
        let changed = form
            .iter()
            .filter(|(k, v)| *v != k.default_value())
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_apply_skips_unlinkable_and_unknown_keys() {
        let s = suggestions(json!({"mappings": {
            "role_request_channel": "1",
            "prefix": "?",
            "bogus": "2",
            "verified_role": 77
        }}));
        let mut form = SettingsForm::default();
        let applied = apply_mappings(&s, &mut form);

        assert_eq!(applied, vec![SettingKey::VerifiedRole]);
        assert_eq!(form.get(SettingKey::VerifiedRole), "77");
        assert_eq!(form.get(SettingKey::Prefix), "!");
        assert_eq!(form.get(SettingKey::RoleRequestChannel), "");
    }

    #[test]
    fn test_applied_notice() {
        assert!(applied_notice(2).starts_with("Applied 2 configurations."));
    }
}
