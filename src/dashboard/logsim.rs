//! Decorative log ticker
//!
//! While the logs tab is active, every tick appends one canned line to the
//! log console and prepends a `[SIGNAL]` line to the overview feed. The
//! first tick that finds the tab inactive stops the ticker for good.

use chrono::Local;

use crate::dashboard::view::{DashboardView, Tab};

/// Canned lines, cycled in order
pub const LOG_LINES: [&str; 7] = [
    "[BRAIN] Intelligence Scout active: Monitoring AE 2026 leaks...",
    "[DB] Cache hit for guild_settings in 2ms.",
    "[AI] Gemini 1.5 Pro processing complex architectural request.",
    "[SECURITY] sentinel_firewall: No threats detected in last 5m.",
    "[SUCCESS] Synced all configurations to Neon Cloud.",
    "[WEBSITE] Rendering dynamic dashboard view.",
    "[NETWORK] Websocket connection stable. Latency: 42ms.",
];

/// Ticker position and panel capacities
#[derive(Debug, Clone)]
pub struct LogTicker {
    index: usize,
    console_capacity: usize,
    feed_capacity: usize,
}

impl LogTicker {
    /// Create a ticker starting at the first canned line
    pub fn new(console_capacity: usize, feed_capacity: usize) -> Self {
        Self {
            index: 0,
            console_capacity,
            feed_capacity,
        }
    }

    /// Advance one tick
    ///
    /// Returns `false`, leaving the view untouched, when the logs tab is not
    /// active; the caller must then stop ticking.
    ///
    /// The overview feed receives the line after the one just written to
    /// the console.
    ///
    /// # Examples
    ///
    /// ```
    /// use guild_dashboard::dashboard::logsim::LogTicker;
    /// use guild_dashboard::dashboard::view::{DashboardView, Tab};
    ///
    /// let mut view = DashboardView { active_tab: Tab::Logs, ..Default::default() };
    /// let mut ticker = LogTicker::new(20, 4);
    ///
    /// assert!(ticker.tick(&mut view));
    /// assert_eq!(view.log_console.len(), 1);
    /// assert!(view.overview_feed[0].starts_with("[SIGNAL] "));
    ///
    /// view.active_tab = Tab::Overview;
    /// assert!(!ticker.tick(&mut view));
    /// ```
    pub fn tick(&mut self, view: &mut DashboardView) -> bool {
        if view.active_tab != Tab::Logs {
            return false;
        }

        let stamp = Local::now().format("%H:%M:%S");
        view.log_console
            .push_back(format!("[{}] {}", stamp, self.line()));
        self.index += 1;
        while view.log_console.len() > self.console_capacity {
            view.log_console.pop_front();
        }

        view.overview_feed
            .push_front(format!("[SIGNAL] {}", self.line()));
        while view.overview_feed.len() > self.feed_capacity {
            view.overview_feed.pop_back();
        }

        true
    }

    fn line(&self) -> &'static str {
        LOG_LINES[self.index % LOG_LINES.len()]
    }
}
