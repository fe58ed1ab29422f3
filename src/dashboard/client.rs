//! The dashboard controller
//!
//! [`DashboardClient`] mediates between the view-model and the backend. It
//! owns the explicit [`ClientState`] and the only writer of the
//! [`DashboardView`] watch channel. Every operation takes `&self`, so a view
//! layer may run several at once; the state mutex is never held across an
//! `.await`.
//!
//! When both are needed, the state mutex is taken before the view is
//! modified.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use crate::api::{DashboardApi, GuildSummary, PlanAction, Suggestions, User};
use crate::config::UiConfig;
use crate::dashboard::ai::{self, PlanEntry, SuggestionEntry};
use crate::dashboard::guilds::{self, GuildCard};
use crate::dashboard::logsim::LogTicker;
use crate::dashboard::settings::{SettingKey, SettingsForm};
use crate::dashboard::state::{
    ClientState, GuildContext, PendingPlan, PendingSuggestions, SelectionTicket,
};
use crate::dashboard::stats::StatsPanel;
use crate::dashboard::view::{self, AuthState, ControlId, DashboardView, GuildListView, Tab};
use crate::error::{DashboardError, Result};
use crate::session::{token_from_redirect, SessionStore};

const SAVE_DENIED: &str = "Target server missing from the synchronization relay.";
const PLAN_DENIED: &str = "No active server selected for architectural planning.";
const AUDIT_DENIED: &str = "Select a server from the 'SERVERS' tab first.";
const PLAN_FAILED: &str = "Brainstorm failed";
const EXECUTE_FAILED: &str = "Manifestation failed";
const AUDIT_BUSY_FALLBACK: &str = "Try again later.";
const AUDIT_INTERRUPTED: &str = "Signals interrupted. Check connection.";

/// Outcome of selecting a guild card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The bot is missing; carries the resolved invite link, if any
    Invite(Option<String>),
    /// The configuration flow ran
    Configure(SettingsLoad),
}

/// Outcome of loading a guild's settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsLoad {
    /// The form now shows the guild's settings
    Loaded,
    /// The fetch failed; the form was left untouched
    Unavailable,
    /// A newer selection started before the response arrived
    Superseded,
}

/// Outcome of a generic trigger action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Sent,
    /// The backend answered with a non-success status
    Rejected(Option<String>),
    /// The request did not complete
    Failed,
}

/// Result of applying audit suggestions
#[derive(Debug)]
pub struct AppliedSuggestions {
    /// Number of form fields that were filled
    pub count: usize,
    /// Background role color update, when one was sent
    pub background: Option<JoinHandle<()>>,
}

struct Inner {
    api: Arc<dyn DashboardApi>,
    store: Box<dyn SessionStore>,
    ui: UiConfig,
    state: Mutex<ClientState>,
    view: watch::Sender<DashboardView>,
}

/// Controller of the dashboard
///
/// Cloning is cheap; clones share state and view.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use guild_dashboard::api::FakeDashboardApi;
/// use guild_dashboard::config::UiConfig;
/// use guild_dashboard::dashboard::{AuthState, DashboardClient};
/// use guild_dashboard::session::MemorySessionStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = DashboardClient::new(
///     Arc::new(FakeDashboardApi::new()),
///     Box::new(MemorySessionStore::new()),
///     UiConfig::default(),
/// );
///
/// // No stored token: the dashboard boots logged out without a request
/// assert_eq!(client.bootstrap(None).await, AuthState::LoggedOut);
/// # }
/// ```
#[derive(Clone)]
pub struct DashboardClient {
    inner: Arc<Inner>,
}

impl DashboardClient {
    /// Create a controller
    ///
    /// # Arguments
    ///
    /// * `api` - Backend to talk to
    /// * `store` - Where the session token is persisted
    /// * `ui` - Label revert delays and panel capacities
    pub fn new(api: Arc<dyn DashboardApi>, store: Box<dyn SessionStore>, ui: UiConfig) -> Self {
        let (view, _) = watch::channel(DashboardView::default());
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                ui,
                state: Mutex::new(ClientState::default()),
                view,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // View access
    // -----------------------------------------------------------------------

    /// Subscribe to view changes
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.inner.view.subscribe()
    }

    /// Snapshot of the current view
    pub fn view(&self) -> DashboardView {
        self.inner.view.borrow().clone()
    }

    /// Drain the alerts raised since the last call
    pub fn take_alerts(&self) -> Vec<String> {
        self.update(|v| std::mem::take(&mut v.alerts))
    }

    fn update<R: Default>(&self, f: impl FnOnce(&mut DashboardView) -> R) -> R {
        update_view(&self.inner, f)
    }

    fn state(&self) -> MutexGuard<'_, ClientState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("Alert: {}", message);
        self.update(|v| v.alerts.push(message));
    }

    /// Revert a control to its idle label after `delay`, unless something
    /// changed it in the meantime
    fn schedule_revert(&self, delay: Duration, control: ControlId, revision: u64) {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                update_view(&inner, |v| {
                    v.controls.get_mut(&control).reset_if(revision);
                });
            }
        });
    }

    // -----------------------------------------------------------------------
    // State access
    // -----------------------------------------------------------------------

    /// The session token currently held
    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    /// The signed-in user
    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    /// Guilds the user manages, in snapshot order
    pub fn managed_guilds(&self) -> Vec<GuildSummary> {
        guilds::managed_guilds(&self.state().guilds)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Every guild of the identity snapshot
    pub fn all_guilds(&self) -> Vec<GuildSummary> {
        self.state().guilds.clone()
    }

    /// The guild being configured
    pub fn active_guild(&self) -> Option<GuildSummary> {
        self.state().active_guild.clone()
    }

    /// Roles and channels of the active guild, once fetched
    pub fn guild_context(&self) -> Option<GuildContext> {
        self.state().context.clone()
    }

    /// The plan awaiting execution
    pub fn pending_plan(&self) -> Option<PendingPlan> {
        self.state().pending_plan.clone()
    }

    /// The audit result awaiting apply or dismiss
    pub fn pending_suggestions(&self) -> Option<Suggestions> {
        self.state()
            .suggestions
            .as_ref()
            .map(|s| s.suggestions.clone())
    }

    fn active_guild_id(&self) -> Option<String> {
        self.state().active_guild_id().map(str::to_string)
    }

    fn require_token(&self) -> Result<String> {
        self.token()
            .ok_or_else(|| DashboardError::NotAuthenticated.into())
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Bootstrap the session
    ///
    /// A token passed in `token_override` replaces the stored one and is
    /// persisted. The token is then confirmed against the identity endpoint.
    /// Any failure clears the stored token and ends logged out.
    ///
    /// # Returns
    ///
    /// Returns the final authentication state, never `Loading`
    pub async fn bootstrap(&self, token_override: Option<String>) -> AuthState {
        let token = match token_override {
            Some(token) => {
                if let Err(e) = self.inner.store.save(&token) {
                    tracing::warn!("Failed to persist session token: {}", e);
                }
                Some(token)
            }
            None => self.inner.store.load().unwrap_or_else(|e| {
                tracing::warn!("Failed to read stored session token: {}", e);
                None
            }),
        };

        let Some(token) = token else {
            tracing::info!("No session token, presenting login");
            self.logout();
            return AuthState::LoggedOut;
        };

        self.state().token = Some(token.clone());
        self.update(|v| v.auth = AuthState::Loading);

        let identity = match self.inner.api.me(&token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("Boot sequence failed: {}", e);
                self.logout();
                return AuthState::LoggedOut;
            }
        };

        let user = match identity.user {
            Some(user) if identity.authenticated => user,
            _ => {
                tracing::info!("Session token not recognised, presenting login");
                self.logout();
                return AuthState::LoggedOut;
            }
        };

        let list = guild_list_view(&identity.guilds);
        tracing::info!(
            "Authenticated as {} ({} guilds)",
            user.name,
            identity.guilds.len()
        );
        {
            let mut state = self.state();
            if state.token.as_deref() != Some(token.as_str()) {
                // A logout or another bootstrap won the race
                return AuthState::LoggedOut;
            }
            state.user = Some(user.clone());
            state.guilds = identity.guilds;
            self.update(|v| {
                v.user_name = Some(user.name.clone());
                v.avatar_url = Some(guilds::avatar_url(&user));
                v.guilds = list;
                v.auth = AuthState::Authenticated;
            });
        }

        self.fetch_stats().await;
        AuthState::Authenticated
    }

    /// Bootstrap from a login redirect carrying `session_token`
    pub async fn bootstrap_from_redirect(&self, redirect: &Url) -> AuthState {
        self.bootstrap(token_from_redirect(redirect)).await
    }

    /// Forget the session and show the logged-out view
    ///
    /// Storage failures are logged and ignored.
    pub fn logout(&self) {
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!("Failed to clear stored session token: {}", e);
        }
        let mut state = self.state();
        state.reset();
        self.update(DashboardView::sign_out);
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Switch tabs; entering the logs tab starts the log simulation once
    pub fn switch_tab(&self, tab: Tab) {
        self.update(|v| v.active_tab = tab);
        if tab == Tab::Logs {
            let first = {
                let mut state = self.state();
                !std::mem::replace(&mut state.log_sim_started, true)
            };
            if first {
                self.start_log_simulation();
            }
        }
    }

    fn start_log_simulation(&self) {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.inner.ui.log_interval();
        let mut ticker = LogTicker::new(
            self.inner.ui.log_console_capacity,
            self.inner.ui.log_feed_capacity,
        );
        tracing::debug!("Starting log simulation every {:?}", period);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                if !update_view(&inner, |v| ticker.tick(v)) {
                    tracing::debug!("Logs tab inactive, log simulation stopped");
                    break;
                }
            }
        });
    }

    /// Select a guild card
    ///
    /// Guilds without the bot go through the invite flow, the others open
    /// the configuration form.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownGuild`] when `guild_id` is not one of
    /// the managed guilds
    pub async fn select_guild(&self, guild_id: &str) -> Result<Selection> {
        let guild = self
            .managed_guilds()
            .into_iter()
            .find(|g| g.id == guild_id)
            .ok_or_else(|| DashboardError::UnknownGuild(guild_id.to_string()))?;

        if guild.bot_present {
            Ok(Selection::Configure(self.open_config(&guild).await))
        } else {
            Ok(Selection::Invite(self.invite(&guild.id).await))
        }
    }

    /// Resolve the bot invite link of a guild
    ///
    /// The link is recorded in the view; failures are silent.
    pub async fn invite(&self, guild_id: &str) -> Option<String> {
        match self.inner.api.invite_url(guild_id).await {
            Ok(url) => {
                tracing::info!("Invite link for guild {}: {}", guild_id, url);
                self.update(|v| v.invite_url = Some(url.clone()));
                Some(url)
            }
            Err(e) => {
                tracing::debug!("Invite lookup for guild {} failed: {}", guild_id, e);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Make `guild` the active guild and load its settings
    ///
    /// The customization tab opens before any request. Settings of a
    /// superseded selection never reach the form.
    pub async fn open_config(&self, guild: &GuildSummary) -> SettingsLoad {
        let ticket = {
            let mut state = self.state();
            let ticket = state.selection.begin(&guild.id);
            state.active_guild = Some(guild.clone());
            state.context = None;
            let plan_dropped = state
                .pending_plan
                .as_ref()
                .is_some_and(|p| p.guild_id != guild.id);
            if plan_dropped {
                state.pending_plan = None;
            }
            let suggestions_dropped = state
                .suggestions
                .as_ref()
                .is_some_and(|s| s.guild_id != guild.id);
            if suggestions_dropped {
                state.suggestions = None;
            }
            self.update(|v| {
                v.customization.title = guild.name.to_uppercase();
                v.customization.form_visible = true;
                v.customization.ai_section_visible = true;
                v.customization.no_guild_hint = false;
                if plan_dropped {
                    v.plan_review.visible = false;
                    v.plan_review.entries.clear();
                }
                if suggestions_dropped {
                    v.suggestion_modal = Default::default();
                }
            });
            ticket
        };
        self.switch_tab(Tab::Customization);
        tracing::info!("Opening configuration of guild {} ({})", guild.name, guild.id);

        let Some(token) = self.token() else {
            return SettingsLoad::Unavailable;
        };

        let api = &self.inner.api;
        let payload = tokio::select! {
            _ = ticket.cancelled() => return SettingsLoad::Superseded,
            result = api.guild_settings(&token, &guild.id) => result,
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!("Settings fetch for guild {} failed: {}", guild.id, e);
                return SettingsLoad::Unavailable;
            }
        };

        let form = SettingsForm::from_payload(&payload);
        {
            let mut state = self.state();
            if !state.selection.is_current(&ticket) {
                tracing::debug!("Dropping stale settings of guild {}", guild.id);
                return SettingsLoad::Superseded;
            }
            state.form_guild = Some(guild.id.clone());
            self.update(|v| {
                v.form = form;
                v.highlighted.clear();
            });
        }

        self.fetch_context(&token, &ticket).await;
        SettingsLoad::Loaded
    }

    async fn fetch_context(&self, token: &str, ticket: &SelectionTicket) {
        let guild_id = ticket.guild_id();
        let api = &self.inner.api;
        let (roles, channels) = tokio::select! {
            _ = ticket.cancelled() => return,
            lists = async {
                tokio::join!(api.guild_roles(token, guild_id), api.guild_channels(token, guild_id))
            } => lists,
        };

        let roles = roles.unwrap_or_else(|e| {
            tracing::debug!("Role fetch for guild {} failed: {}", guild_id, e);
            Vec::new()
        });
        let channels = channels.unwrap_or_else(|e| {
            tracing::debug!("Channel fetch for guild {} failed: {}", guild_id, e);
            Vec::new()
        });

        let mut state = self.state();
        if state.selection.is_current(ticket) {
            state.context = Some(GuildContext {
                guild_id: guild_id.to_string(),
                roles,
                channels,
            });
        }
    }

    /// Current form contents
    pub fn form(&self) -> SettingsForm {
        self.inner.view.borrow().form.clone()
    }

    /// Edit one form field
    pub fn set_field(&self, key: SettingKey, value: impl Into<String>) {
        let value = value.into();
        self.update(|v| v.form.set(key, value));
    }

    /// Submit the whole form as one update
    ///
    /// The save control is disabled while the request runs and shows the
    /// outcome until the status delay elapses.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NoActiveGuild`] (and raises an alert) when no
    /// guild is selected, [`DashboardError::SettingsNotLoaded`] (and raises an
    /// alert) when the form does not hold that guild's settings,
    /// [`DashboardError::SaveInProgress`] when a save is already running, or
    /// the request error
    pub async fn save_settings(&self) -> Result<()> {
        let (guild_id, token) = {
            let mut state = self.state();
            let Some(guild_id) = state.active_guild_id().map(str::to_string) else {
                drop(state);
                let err = DashboardError::NoActiveGuild(SAVE_DENIED.to_string());
                self.alert(err.to_string());
                return Err(err.into());
            };
            if state.form_guild.as_deref() != Some(guild_id.as_str()) {
                drop(state);
                tracing::warn!("Refusing to save guild {}: its settings are not loaded", guild_id);
                let err = DashboardError::SettingsNotLoaded(guild_id);
                self.alert(err.to_string());
                return Err(err.into());
            }
            if state.save_in_flight {
                return Err(DashboardError::SaveInProgress.into());
            }
            let Some(token) = state.token.clone() else {
                return Err(DashboardError::NotAuthenticated.into());
            };
            state.save_in_flight = true;
            (guild_id, token)
        };

        let form = self.update(|v| {
            v.controls.save.busy(view::SAVE_BUSY);
            v.form.clone()
        });
        tracing::info!("Saving settings of guild {}", guild_id);

        let result = self
            .inner
            .api
            .save_guild_settings(&token, &guild_id, &form.to_payload())
            .await;

        self.state().save_in_flight = false;
        let label = match &result {
            Ok(()) => view::SAVE_OK,
            Err(e) => {
                tracing::warn!("Settings save for guild {} failed: {}", guild_id, e);
                view::SAVE_FAILED
            }
        };
        let revision = self.update(|v| v.controls.save.show(label, true));
        self.schedule_revert(self.inner.ui.status_revert(), ControlId::Save, revision);
        result
    }

    // -----------------------------------------------------------------------
    // Generic actions
    // -----------------------------------------------------------------------

    /// Ask the bot to run `action` in the active guild
    ///
    /// Returns `None` without a request when no guild is selected.
    pub async fn trigger_action(&self, action: &str) -> Option<TriggerOutcome> {
        let (guild_id, token) = {
            let state = self.state();
            (state.active_guild_id()?.to_string(), state.token.clone()?)
        };
        let control = ControlId::Trigger(action.to_string());
        self.update(|v| v.controls.get_mut(&control).busy(view::TRIGGER_BUSY));

        let outcome = match self
            .inner
            .api
            .trigger_action(&token, &guild_id, action)
            .await
        {
            Ok(status) if status.is_success() => TriggerOutcome::Sent,
            Ok(status) => {
                tracing::error!(
                    "Action {} rejected: {}",
                    action,
                    status.error.as_deref().unwrap_or(&status.status)
                );
                TriggerOutcome::Rejected(status.error)
            }
            Err(e) => {
                tracing::warn!("Action {} failed: {}", action, e);
                TriggerOutcome::Failed
            }
        };

        let label = match outcome {
            TriggerOutcome::Sent => view::TRIGGER_OK,
            TriggerOutcome::Rejected(_) => view::TRIGGER_ERROR,
            TriggerOutcome::Failed => view::TRIGGER_FAILED,
        };
        let revision = self.update(|v| v.controls.get_mut(&control).show(label, false));
        self.schedule_revert(self.inner.ui.status_revert(), control, revision);
        Some(outcome)
    }

    // -----------------------------------------------------------------------
    // AI architect
    // -----------------------------------------------------------------------

    /// Edit the architect prompt
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.update(|v| v.ai_prompt = prompt);
    }

    /// Ask the AI architect for a plan
    ///
    /// On success the plan is stored for [`execute_plan`](Self::execute_plan)
    /// and shown in the review panel.
    ///
    /// # Errors
    ///
    /// Every error is also raised as an alert: no active guild, blank
    /// prompt, HTTP failure or a rejected plan
    pub async fn propose_plan(&self, prompt: &str) -> Result<Vec<PlanEntry>> {
        let Some(guild_id) = self.active_guild_id() else {
            let err = DashboardError::NoActiveGuild(PLAN_DENIED.to_string());
            self.alert(err.to_string());
            return Err(err.into());
        };
        let prompt = prompt.trim();
        if prompt.is_empty() {
            let err = DashboardError::EmptyPrompt;
            self.alert(err.to_string());
            return Err(err.into());
        }
        let token = self.require_token()?;

        self.update(|v| {
            v.ai_prompt = prompt.to_string();
            v.controls.architect.busy(view::ARCHITECT_BUSY);
        });
        tracing::info!("Requesting AI plan for guild {}", guild_id);

        let result = match self.inner.api.ai_plan(&token, &guild_id, prompt).await {
            Ok(response) if response.status == crate::api::STATUS_SUCCESS => match response.plan
            {
                Some(plan) => Ok(plan),
                None => Err(DashboardError::Rejected(PLAN_FAILED.to_string()).into()),
            },
            Ok(response) => Err(DashboardError::Rejected(
                response.error.unwrap_or_else(|| PLAN_FAILED.to_string()),
            )
            .into()),
            Err(e) => Err(e),
        };

        let plan: Vec<PlanAction> = match result {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!("Architect error: {}", e);
                let revision = self.update(|v| {
                    v.controls
                        .architect
                        .show(view::ARCHITECT_FAILED, false)
                });
                self.schedule_revert(
                    self.inner.ui.ai_error_revert(),
                    ControlId::Architect,
                    revision,
                );
                self.alert(e.to_string());
                return Err(e);
            }
        };

        let entries = ai::plan_entries(&plan);
        {
            let mut state = self.state();
            if state.active_guild_id() != Some(guild_id.as_str()) {
                drop(state);
                tracing::debug!("Dropping plan for deselected guild {}", guild_id);
                self.update(|v| {
                    v.controls.architect.reset_if(v.controls.architect.revision());
                });
                return Err(DashboardError::SelectionSuperseded(guild_id).into());
            }
            state.pending_plan = Some(PendingPlan {
                guild_id,
                actions: plan,
            });
            self.update(|v| {
                v.plan_review.visible = true;
                v.plan_review.entries = entries.clone();
                v.plan_review.generation += 1;
                v.controls.architect.show(view::ARCHITECT_DONE, true);
            });
        }
        Ok(entries)
    }

    /// Execute the stored plan, unmodified, against the guild it was
    /// proposed for
    ///
    /// # Returns
    ///
    /// Returns `Ok(false)` without a request when no plan is stored, and
    /// `Ok(true)` once the backend confirms execution
    ///
    /// # Errors
    ///
    /// On failure the error is alerted, the review stays visible and the
    /// plan is kept so execution can be retried
    pub async fn execute_plan(&self) -> Result<bool> {
        let Some(plan) = self.pending_plan() else {
            return Ok(false);
        };
        let token = self.require_token()?;

        self.update(|v| v.controls.execute.busy(view::EXECUTE_BUSY));
        tracing::info!(
            "Executing {} planned actions in guild {}",
            plan.actions.len(),
            plan.guild_id
        );

        let result = match self
            .inner
            .api
            .ai_execute(&token, &plan.guild_id, &plan.actions)
            .await
        {
            Ok(status) if status.is_success() => Ok(()),
            Ok(status) => Err(DashboardError::Rejected(
                status.error.unwrap_or_else(|| EXECUTE_FAILED.to_string()),
            )
            .into()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::error!("Execution error: {}", e);
            let revision = self.update(|v| v.controls.execute.show(view::EXECUTE_FAILED, false));
            self.schedule_revert(self.inner.ui.ai_error_revert(), ControlId::Execute, revision);
            self.alert(e.to_string());
            return Err(e);
        }

        {
            let mut state = self.state();
            if state.pending_plan.as_ref() == Some(&plan) {
                state.pending_plan = None;
            }
        }
        let (revision, generation) = self.update(|v| {
            v.ai_prompt.clear();
            (
                v.controls.execute.show(view::EXECUTE_OK, false),
                v.plan_review.generation,
            )
        });

        let inner = Arc::downgrade(&self.inner);
        let delay = self.inner.ui.ai_success_hide();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                update_view(&inner, |v| {
                    if v.plan_review.generation == generation {
                        v.plan_review.visible = false;
                    }
                    v.controls.execute.reset_if(revision);
                });
            }
        });
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // AI audit
    // -----------------------------------------------------------------------

    /// Ask the AI auditor to map settings to existing resources
    ///
    /// On success the suggestion modal opens. The audit control is restored
    /// as soon as the request completes.
    ///
    /// # Errors
    ///
    /// Every request error is also raised as an alert. A result for a guild
    /// that is no longer selected is dropped with
    /// [`DashboardError::SelectionSuperseded`].
    pub async fn audit(&self) -> Result<Vec<SuggestionEntry>> {
        let Some(guild_id) = self.active_guild_id() else {
            let err = DashboardError::NoActiveGuild(AUDIT_DENIED.to_string());
            self.alert(err.to_string());
            return Err(err.into());
        };
        let token = self.require_token()?;

        let revision = self.update(|v| v.controls.audit.busy(view::AUDIT_BUSY));
        tracing::info!("Requesting AI audit of guild {}", guild_id);
        let response = self.inner.api.ai_suggest(&token, &guild_id).await;
        self.update(|v| v.controls.audit.reset_if(revision));

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Audit of guild {} failed: {}", guild_id, e);
                self.alert(AUDIT_INTERRUPTED);
                return Err(e);
            }
        };

        let suggestions = match response.suggestions {
            Some(suggestions) if response.status == crate::api::STATUS_SUCCESS => suggestions,
            _ => {
                let reason = response
                    .error
                    .unwrap_or_else(|| AUDIT_BUSY_FALLBACK.to_string());
                tracing::error!("Audit of guild {} rejected: {}", guild_id, reason);
                self.alert(format!("AI Auditor Busy: {}", reason));
                return Err(DashboardError::Rejected(reason).into());
            }
        };

        let entries = ai::suggestion_entries(&suggestions);
        {
            let mut state = self.state();
            if state.active_guild_id() != Some(guild_id.as_str()) {
                tracing::debug!("Dropping audit of deselected guild {}", guild_id);
                return Err(DashboardError::SelectionSuperseded(guild_id).into());
            }
            self.update(|v| {
                v.suggestion_modal.open = true;
                v.suggestion_modal.reasoning = suggestions.reasoning.clone();
                v.suggestion_modal.entries = entries.clone();
            });
            state.suggestions = Some(PendingSuggestions {
                guild_id,
                suggestions,
            });
        }
        Ok(entries)
    }

    /// Fill the form from the stored audit result
    ///
    /// Linkable mappings are written into the form and highlighted; role
    /// color suggestions are sent in the background. Returns `None` when no
    /// audit result is stored for the active guild.
    pub fn apply_suggestions(&self) -> Option<AppliedSuggestions> {
        let (pending, token) = {
            let mut state = self.state();
            let pending = state.suggestions.take()?;
            if state.active_guild_id() != Some(pending.guild_id.as_str()) {
                tracing::debug!(
                    "Discarding audit of guild {}: no longer selected",
                    pending.guild_id
                );
                self.update(|v| v.suggestion_modal = Default::default());
                return None;
            }
            (pending, state.token.clone())
        };
        let PendingSuggestions {
            guild_id,
            suggestions,
        } = pending;

        let (applied, highlight) = self.update(|v| {
            let applied = ai::apply_mappings(&suggestions, &mut v.form);
            let highlight = v.highlighted.values().max().copied().unwrap_or(0) + 1;
            for key in &applied {
                v.highlighted.insert(*key, highlight);
            }
            v.suggestion_modal = Default::default();
            (applied, highlight)
        });
        let count = applied.len();
        tracing::info!("Applied {} suggested links to guild {}", count, guild_id);

        if !applied.is_empty() {
            let inner = Arc::downgrade(&self.inner);
            let delay = self.inner.ui.highlight();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(inner) = inner.upgrade() {
                    update_view(&inner, |v| {
                        v.highlighted.retain(|_, revision| *revision != highlight);
                    });
                }
            });
        }

        let colors = suggestions.role_color_suggestions;
        let background = match token {
            Some(token) if !colors.is_empty() => {
                let api = Arc::clone(&self.inner.api);
                Some(tokio::spawn(async move {
                    match api.apply_suggestions(&token, &guild_id, &colors).await {
                        Ok(()) => tracing::info!(
                            "Sent {} role color updates to guild {}",
                            colors.len(),
                            guild_id
                        ),
                        Err(e) => {
                            tracing::warn!("Role color update for guild {} failed: {}", guild_id, e)
                        }
                    }
                }))
            }
            _ => None,
        };

        self.alert(ai::applied_notice(count));
        Some(AppliedSuggestions { count, background })
    }

    /// Close the suggestion modal and discard the audit result
    pub fn dismiss_suggestions(&self) {
        let mut state = self.state();
        state.suggestions = None;
        self.update(|v| v.suggestion_modal = Default::default());
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    /// Refresh the overview statistics; failures are silent
    pub async fn fetch_stats(&self) -> Option<StatsPanel> {
        let token = self.token()?;
        match self.inner.api.stats(&token).await {
            Ok(stats) => {
                let panel = StatsPanel::from_stats(&stats);
                self.update(|v| v.stats = Some(panel.clone()));
                Some(panel)
            }
            Err(e) => {
                tracing::debug!("Stats fetch failed: {}", e);
                None
            }
        }
    }
}

/// Modify the view and return what `f` produced
fn update_view<R: Default>(inner: &Inner, f: impl FnOnce(&mut DashboardView) -> R) -> R {
    let mut out = R::default();
    inner.view.send_modify(|view| out = f(view));
    out
}

/// Derive the grid of a guild snapshot
fn guild_list_view(guilds: &[GuildSummary]) -> GuildListView {
    let cards: Vec<GuildCard> = guilds::guild_cards(guilds);
    if cards.is_empty() {
        GuildListView::Empty
    } else {
        GuildListView::Cards(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FakeDashboardApi, IdentityResponse};
    use crate::session::{MemorySessionStore, MockSessionStore};
    use crate::test_utils::{fast_ui_config, signed_in_client};

    fn identity() -> IdentityResponse {
        serde_json::from_value(serde_json::json!({
            "authenticated": true,
            "user": {"id": "1", "name": "Prime", "avatar": null},
            "guilds": [{"id": "10", "name": "Alpha", "permissions": 8, "bot_present": true}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_logout_swallows_storage_errors() {
        let mut store = MockSessionStore::new();
        store.expect_load().returning(|| Ok(None));
        store
            .expect_clear()
            .times(1)
            .returning(|| Err(DashboardError::Session("disk gone".to_string()).into()));

        let client = DashboardClient::new(
            Arc::new(FakeDashboardApi::new()),
            Box::new(store),
            UiConfig::default(),
        );
        assert_eq!(client.bootstrap(None).await, AuthState::LoggedOut);
        assert_eq!(client.view().auth, AuthState::LoggedOut);
    }

    #[tokio::test]
    async fn test_token_override_is_persisted() {
        let mut store = MockSessionStore::new();
        store
            .expect_save()
            .withf(|token| token == "fresh")
            .times(1)
            .returning(|_| Ok(()));
        store.expect_load().never();

        let api = FakeDashboardApi::new();
        api.set_identity("fresh", identity());
        let client = DashboardClient::new(Arc::new(api), Box::new(store), UiConfig::default());

        assert_eq!(
            client.bootstrap(Some("fresh".to_string())).await,
            AuthState::Authenticated
        );
    }

    #[tokio::test]
    async fn test_authenticated_without_user_is_logged_out() {
        let api = FakeDashboardApi::new();
        api.set_identity(
            "t",
            IdentityResponse {
                authenticated: true,
                ..Default::default()
            },
        );
        let client = DashboardClient::new(
            Arc::new(api),
            Box::new(MemorySessionStore::with_token("t")),
            UiConfig::default(),
        );
        assert_eq!(client.bootstrap(None).await, AuthState::LoggedOut);
        assert!(client.user().is_none());
    }

    #[test]
    fn test_guild_list_view_empty() {
        assert_eq!(guild_list_view(&[]), GuildListView::Empty);
    }

    #[tokio::test]
    async fn test_unmanaged_guild_cannot_be_selected() {
        let (client, api) = signed_in_client().await;

        let err = client.select_guild("30").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::UnknownGuild(id)) if id == "30"
        ));
        assert_eq!(api.call_count("GET /api/guilds/30/settings"), 0);
    }

    #[tokio::test]
    async fn test_guild_without_bot_goes_through_invite() {
        let (client, api) = signed_in_client().await;
        api.set_invite_base("https://discord.com/oauth2/authorize");

        let selection = client.select_guild("20").await.unwrap();
        assert!(matches!(selection, Selection::Invite(Some(_))));
        assert!(client.active_guild().is_none());
        assert_eq!(api.call_count("GET /api/guilds/20/settings"), 0);
    }

    #[tokio::test]
    async fn test_save_without_guild_raises_alert() {
        let (client, api) = signed_in_client().await;

        let err = client.save_settings().await.unwrap_err();
        assert!(err.to_string().starts_with("PROTOCOL DENIED"));
        assert_eq!(client.take_alerts().len(), 1);
        assert!(api.saved_settings().is_empty());
    }

    #[tokio::test]
    async fn test_status_label_reverts_after_delay() {
        let (client, api) = signed_in_client().await;
        api.set_settings("10", Ok(serde_json::Map::new()));
        client.select_guild("10").await.unwrap();

        client.save_settings().await.unwrap();
        assert_eq!(client.view().controls.save.label, view::SAVE_OK);

        tokio::time::sleep(fast_ui_config().status_revert() * 4).await;
        assert_eq!(client.view().controls.save.label, view::SAVE_IDLE);
    }

    #[tokio::test]
    async fn test_log_simulation_starts_once() {
        let (client, _api) = signed_in_client().await;
        client.switch_tab(Tab::Logs);
        client.switch_tab(Tab::Logs);

        tokio::time::sleep(fast_ui_config().log_interval() * 3 + Duration::from_millis(10)).await;
        let lines = client.view().log_console.len();
        assert!((2..=4).contains(&lines), "unexpected line count {}", lines);
    }

    #[tokio::test]
    async fn test_log_simulation_stops_when_tab_left() {
        let (client, _api) = signed_in_client().await;
        client.switch_tab(Tab::Logs);
        tokio::time::sleep(fast_ui_config().log_interval() * 2).await;
        client.switch_tab(Tab::Overview);
        tokio::time::sleep(fast_ui_config().log_interval() * 2).await;
        let stopped_at = client.view().log_console.len();

        client.switch_tab(Tab::Logs);
        tokio::time::sleep(fast_ui_config().log_interval() * 3).await;
        assert_eq!(client.view().log_console.len(), stopped_at);
    }
}
