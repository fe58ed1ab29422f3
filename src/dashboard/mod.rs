//! Dashboard controller and view-model
//!
//! The [`DashboardClient`] controller drives every user operation of the
//! dashboard against a [`DashboardApi`](crate::api::DashboardApi) backend
//! and publishes the resulting [`DashboardView`]. The submodules hold the
//! pieces it is built from:
//!
//! - [`state`] -- explicit client state and guild selection tickets
//! - [`view`] -- the view-model and its controls
//! - [`guilds`] -- managed guild filter and card derivation
//! - [`settings`] -- settings keys and the editable form
//! - [`ai`] -- plan preview and audit suggestions
//! - [`stats`] -- overview statistics
//! - [`logsim`] -- decorative log ticker

pub mod ai;
pub mod client;
pub mod guilds;
pub mod logsim;
pub mod settings;
pub mod state;
pub mod stats;
pub mod view;

pub use client::{AppliedSuggestions, DashboardClient, Selection, SettingsLoad, TriggerOutcome};
pub use settings::{SettingKey, SettingsForm};
pub use state::{GuildContext, PendingPlan};
pub use view::{AuthState, DashboardView, GuildListView, Tab};
