//! Dashboard view-model
//!
//! [`DashboardView`] is everything a view layer needs to draw the
//! dashboard. The controller owns the only writer and publishes every change
//! on a `tokio::sync::watch` channel; views subscribe and render.
//!
//! Buttons are modelled as [`Control`]s. A control carries a revision that
//! is bumped on every label change, so a delayed revert scheduled by one
//! operation never clobbers the state set by a newer one.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::dashboard::ai::{PlanEntry, SuggestionEntry};
use crate::dashboard::guilds::GuildCard;
use crate::dashboard::settings::{SettingKey, SettingsForm};
use crate::dashboard::stats::StatsPanel;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Control labels
// ---------------------------------------------------------------------------

pub const SAVE_IDLE: &str = "SYNC ALL CHANGES";
pub const SAVE_BUSY: &str = "SYNCING SIGNALS...";
pub const SAVE_OK: &str = "✓ SIGNALS SYNCED";
pub const SAVE_FAILED: &str = "❌ SYNC FAILED";

pub const TRIGGER_BUSY: &str = "SENDING...";
pub const TRIGGER_OK: &str = "✓ SENT";
pub const TRIGGER_ERROR: &str = "❌ ERROR";
pub const TRIGGER_FAILED: &str = "❌ FAIL";

pub const ARCHITECT_IDLE: &str = "GENERATE ARCHITECTURE";
pub const ARCHITECT_BUSY: &str = "BRAINSTORMING STRUCTURE...";
pub const ARCHITECT_DONE: &str = "PLAN GENERATED";
pub const ARCHITECT_FAILED: &str = "AI CALCULATION ERROR";

pub const EXECUTE_IDLE: &str = "EXECUTE PLAN";
pub const EXECUTE_BUSY: &str = "MANIFESTING ARCHITECTURE...";
pub const EXECUTE_OK: &str = "✓ ACTION COMPLETE - IT'S DONE!";
pub const EXECUTE_FAILED: &str = "EXECUTION ERROR";

pub const AUDIT_IDLE: &str = "AI AUTO-LINK";
pub const AUDIT_BUSY: &str = "AI AUDITING SERVER...";

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Authentication state of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// Bootstrap has not finished
    Loading,
    LoggedOut,
    Authenticated,
}

/// Navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Overview,
    Servers,
    Customization,
    Logs,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Servers => "servers",
            Tab::Customization => "customization",
            Tab::Logs => "logs",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = DashboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overview" => Ok(Tab::Overview),
            "servers" => Ok(Tab::Servers),
            "customization" => Ok(Tab::Customization),
            "logs" => Ok(Tab::Logs),
            other => Err(DashboardError::Config(format!("Unknown tab: {}", other))),
        }
    }
}

/// Content of the servers grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "cards", rename_all = "snake_case")]
pub enum GuildListView {
    /// No identity loaded yet
    NotLoaded,
    /// The user manages no guild
    Empty,
    Cards(Vec<GuildCard>),
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// A button with a transient status label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub idle_label: String,
    pub label: String,
    pub enabled: bool,
    #[serde(skip)]
    revision: u64,
}

impl Control {
    /// An enabled control showing `idle_label`
    pub fn new(idle_label: &str) -> Self {
        Self {
            idle_label: idle_label.to_string(),
            label: idle_label.to_string(),
            enabled: true,
            revision: 0,
        }
    }

    /// Show `label` and disable the control; returns the new revision
    pub fn busy(&mut self, label: &str) -> u64 {
        self.show(label, false)
    }

    /// Show `label` with the given enabled state; returns the new revision
    pub fn show(&mut self, label: &str, enabled: bool) -> u64 {
        self.label = label.to_string();
        self.enabled = enabled;
        self.revision += 1;
        self.revision
    }

    /// Restore the idle label and enable the control, unless something
    /// changed it since `revision`
    ///
    /// Returns whether the control was reset.
    ///
    /// # Examples
    ///
    /// ```
    /// use guild_dashboard::dashboard::view::Control;
    ///
    /// let mut control = Control::new("SAVE");
    /// let first = control.busy("SAVING...");
    /// let second = control.show("SAVED", true);
    ///
    /// assert!(!control.reset_if(first));
    /// assert_eq!(control.label, "SAVED");
    /// assert!(control.reset_if(second));
    /// assert_eq!(control.label, "SAVE");
    /// ```
    pub fn reset_if(&mut self, revision: u64) -> bool {
        if self.revision != revision {
            return false;
        }
        self.label = self.idle_label.clone();
        self.enabled = true;
        self.revision += 1;
        true
    }

    /// Current revision
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the control shows its idle label
    pub fn is_idle(&self) -> bool {
        self.label == self.idle_label
    }
}

/// Identifies one control of the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlId {
    Save,
    Architect,
    Execute,
    Audit,
    /// The button of a generic trigger action
    Trigger(String),
}

/// Every button of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub save: Control,
    pub architect: Control,
    pub execute: Control,
    pub audit: Control,
    /// Trigger buttons by action name, created on first use
    pub triggers: BTreeMap<String, Control>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            save: Control::new(SAVE_IDLE),
            architect: Control::new(ARCHITECT_IDLE),
            execute: Control::new(EXECUTE_IDLE),
            audit: Control::new(AUDIT_IDLE),
            triggers: BTreeMap::new(),
        }
    }
}

impl Controls {
    /// Mutable access to a control, creating trigger controls on demand
    pub fn get_mut(&mut self, id: &ControlId) -> &mut Control {
        match id {
            ControlId::Save => &mut self.save,
            ControlId::Architect => &mut self.architect,
            ControlId::Execute => &mut self.execute,
            ControlId::Audit => &mut self.audit,
            ControlId::Trigger(action) => self
                .triggers
                .entry(action.clone())
                .or_insert_with(|| Control::new(&action.to_uppercase())),
        }
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// Header and visibility of the customization tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomizationPanel {
    /// Upper-cased name of the active guild
    pub title: String,
    pub form_visible: bool,
    pub ai_section_visible: bool,
    /// "No guild selected" hint
    pub no_guild_hint: bool,
}

impl Default for CustomizationPanel {
    fn default() -> Self {
        Self {
            title: String::new(),
            form_visible: false,
            ai_section_visible: false,
            no_guild_hint: true,
        }
    }
}

/// AI architect plan preview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanReview {
    pub visible: bool,
    pub entries: Vec<PlanEntry>,
    /// Bumped whenever a new plan is shown
    #[serde(skip)]
    pub generation: u64,
}

/// AI audit result dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionModal {
    pub open: bool,
    pub reasoning: String,
    pub entries: Vec<SuggestionEntry>,
}

// ---------------------------------------------------------------------------
// DashboardView
// ---------------------------------------------------------------------------

/// The whole rendered state of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub auth: AuthState,
    pub user_name: Option<String>,
    pub avatar_url: Option<String>,
    pub guilds: GuildListView,
    pub active_tab: Tab,
    pub customization: CustomizationPanel,
    pub form: SettingsForm,
    /// Fields recently filled by the auditor, with the highlight revision
    pub highlighted: BTreeMap<SettingKey, u64>,
    pub ai_prompt: String,
    pub plan_review: PlanReview,
    pub suggestion_modal: SuggestionModal,
    pub stats: Option<StatsPanel>,
    pub controls: Controls,
    /// Log console, oldest first
    pub log_console: VecDeque<String>,
    /// Overview signal feed, newest first
    pub overview_feed: VecDeque<String>,
    /// Messages waiting to be shown to the user
    pub alerts: Vec<String>,
    /// Last resolved invite link, to be opened by the view layer
    pub invite_url: Option<String>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            auth: AuthState::Loading,
            user_name: None,
            avatar_url: None,
            guilds: GuildListView::NotLoaded,
            active_tab: Tab::Overview,
            customization: CustomizationPanel::default(),
            form: SettingsForm::default(),
            highlighted: BTreeMap::new(),
            ai_prompt: String::new(),
            plan_review: PlanReview::default(),
            suggestion_modal: SuggestionModal::default(),
            stats: None,
            controls: Controls::default(),
            log_console: VecDeque::new(),
            overview_feed: VecDeque::new(),
            alerts: Vec::new(),
            invite_url: None,
        }
    }
}

impl DashboardView {
    /// Whether `key` is currently highlighted
    pub fn is_highlighted(&self, key: SettingKey) -> bool {
        self.highlighted.contains_key(&key)
    }

    /// Reset everything tied to a signed-in user
    ///
    /// The log console, the overview feed and the active tab survive.
    pub(crate) fn sign_out(&mut self) {
        let log_console = std::mem::take(&mut self.log_console);
        let overview_feed = std::mem::take(&mut self.overview_feed);
        let active_tab = self.active_tab;
        *self = DashboardView {
            auth: AuthState::LoggedOut,
            active_tab,
            log_console,
            overview_feed,
            ..DashboardView::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_busy_disables() {
        let mut control = Control::new(SAVE_IDLE);
        control.busy(SAVE_BUSY);
        assert!(!control.enabled);
        assert_eq!(control.label, SAVE_BUSY);
        assert!(!control.is_idle());
    }

    #[test]
    fn test_stale_revert_is_ignored() {
        let mut control = Control::new(ARCHITECT_IDLE);
        let failed = control.show(ARCHITECT_FAILED, false);
        control.busy(ARCHITECT_BUSY);

        assert!(!control.reset_if(failed));
        assert_eq!(control.label, ARCHITECT_BUSY);
        assert!(!control.enabled);
    }

    #[test]
    fn test_trigger_controls_are_created_on_demand() {
        let mut controls = Controls::default();
        let control = controls.get_mut(&ControlId::Trigger("purge".to_string()));
        assert_eq!(control.idle_label, "PURGE");
        assert_eq!(controls.triggers.len(), 1);
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("LOGS".parse::<Tab>().unwrap(), Tab::Logs);
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn test_sign_out_keeps_logs() {
        let mut view = DashboardView {
            auth: AuthState::Authenticated,
            user_name: Some("Prime".to_string()),
            active_tab: Tab::Logs,
            ..Default::default()
        };
        view.log_console.push_back("line".to_string());

        view.sign_out();

        assert_eq!(view.auth, AuthState::LoggedOut);
        assert_eq!(view.user_name, None);
        assert_eq!(view.active_tab, Tab::Logs);
        assert_eq!(view.log_console.len(), 1);
    }
}
