//! Controller state
//!
//! [`ClientState`] replaces a page-global singleton: it holds the session,
//! the identity snapshot, the active guild and the transient AI results.
//! [`SelectionTracker`] hands out one [`SelectionTicket`] per guild
//! selection; beginning a new selection cancels the previous ticket so
//! in-flight fetches for it stop and their results are dropped.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::api::{GuildResource, GuildSummary, PlanAction, Suggestions, User};

/// A plan proposed by the AI architect, bound to its guild
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlan {
    pub guild_id: String,
    pub actions: Vec<PlanAction>,
}

/// An audit result, bound to its guild
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSuggestions {
    pub guild_id: String,
    pub suggestions: Suggestions,
}

/// Roles and channels of the selected guild
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuildContext {
    pub guild_id: String,
    pub roles: Vec<GuildResource>,
    pub channels: Vec<GuildResource>,
}

/// Proof of one guild selection
#[derive(Debug, Clone)]
pub struct SelectionTicket {
    generation: u64,
    guild_id: String,
    token: CancellationToken,
}

impl SelectionTicket {
    /// Guild this selection is for
    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    /// Completes once a newer selection supersedes this one
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Whether a newer selection superseded this one
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Issues selection tickets, cancelling superseded ones
#[derive(Debug, Default)]
pub struct SelectionTracker {
    generation: u64,
    current: Option<CancellationToken>,
}

impl SelectionTracker {
    /// Start a selection of `guild_id`, cancelling the previous one
    ///
    /// # Examples
    ///
    /// ```
    /// use guild_dashboard::dashboard::state::SelectionTracker;
    ///
    /// let mut tracker = SelectionTracker::default();
    /// let first = tracker.begin("1");
    /// let second = tracker.begin("2");
    ///
    /// assert!(first.is_cancelled());
    /// assert!(!tracker.is_current(&first));
    /// assert!(tracker.is_current(&second));
    /// ```
    pub fn begin(&mut self, guild_id: &str) -> SelectionTicket {
        self.cancel();
        self.generation += 1;
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        SelectionTicket {
            generation: self.generation,
            guild_id: guild_id.to_string(),
            token,
        }
    }

    /// Whether `ticket` belongs to the latest selection
    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        ticket.generation == self.generation && !ticket.token.is_cancelled()
    }

    /// Cancel the current selection, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

/// Everything the controller knows about the session
#[derive(Debug, Default)]
pub struct ClientState {
    pub token: Option<String>,
    pub user: Option<User>,
    pub guilds: Vec<GuildSummary>,
    pub active_guild: Option<GuildSummary>,
    pub context: Option<GuildContext>,
    /// Guild whose settings the form holds
    pub form_guild: Option<String>,
    pub pending_plan: Option<PendingPlan>,
    pub suggestions: Option<PendingSuggestions>,
    pub save_in_flight: bool,
    pub log_sim_started: bool,
    pub selection: SelectionTracker,
}

impl ClientState {
    /// Forget the session and everything derived from it
    ///
    /// The log simulation flag survives: the ticker runs at most once per
    /// controller.
    pub fn reset(&mut self) {
        self.selection.cancel();
        self.token = None;
        self.user = None;
        self.guilds.clear();
        self.active_guild = None;
        self.context = None;
        self.form_guild = None;
        self.pending_plan = None;
        self.suggestions = None;
        self.save_in_flight = false;
    }

    /// Id of the active guild
    pub fn active_guild_id(&self) -> Option<&str> {
        self.active_guild.as_ref().map(|g| g.id.as_str())
    }
}
