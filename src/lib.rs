//! Guild dashboard - admin client for a Discord bot
//!
//! This library provides the dashboard controller that signs a user in with
//! a session token, lists the guilds they manage, edits per-guild bot
//! configuration, and drives the AI architect and AI audit flows.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend API trait, HTTP implementation, in-memory fake, wire types
//! - `session`: Session token storage (keyring, file, memory)
//! - `dashboard`: The controller, its state and the view-model it publishes
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `logging`: Tracing subscriber setup
//! - `cli`, `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use guild_dashboard::api::HttpDashboardApi;
//! use guild_dashboard::dashboard::{AuthState, DashboardClient};
//! use guild_dashboard::session::build_session_store;
//! use guild_dashboard::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = DashboardClient::new(
//!         Arc::new(HttpDashboardApi::new(&config.api)?),
//!         build_session_store(&config.session),
//!         config.ui.clone(),
//!     );
//!     if client.bootstrap(None).await == AuthState::Authenticated {
//!         println!("{:?}", client.view().guilds);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use api::{DashboardApi, FakeDashboardApi, HttpDashboardApi};
pub use config::Config;
pub use dashboard::{DashboardClient, DashboardView};
pub use error::{DashboardError, Result};

#[cfg(test)]
pub mod test_utils;
