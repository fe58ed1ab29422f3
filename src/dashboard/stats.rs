//! Overview statistics and leaderboard

use serde::Serialize;

use crate::api::{DashboardStats, LeaderboardEntry};

/// Format a count compactly: `1.2M`, `3.4K`, or the plain number
///
/// # Examples
///
/// ```
/// use guild_dashboard::dashboard::stats::format_count;
///
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(1_500), "1.5K");
/// assert_eq!(format_count(2_340_000), "2.3M");
/// ```
pub fn format_count(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Leaderboard shown until the backend provides one
pub fn mock_leaderboard() -> Vec<LeaderboardEntry> {
    [
        ("...4412", "Prime", 99, 125_000),
        ("...8892", "Shadow", 85, 92_000),
        ("...1123", "Operator", 42, 33_000),
    ]
    .into_iter()
    .map(|(id, username, level, xp)| LeaderboardEntry {
        id: id.to_string(),
        username: Some(username.to_string()),
        level,
        xp,
    })
    .collect()
}

/// One rendered leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    /// 1-based rank
    pub rank: usize,
    pub name: String,
    pub level: u32,
    /// Compact XP, e.g. `125.0K`
    pub xp: String,
}

impl LeaderboardRow {
    fn from_entry(rank: usize, entry: &LeaderboardEntry) -> Self {
        let name = match entry.username.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let chars: Vec<char> = entry.id.chars().collect();
                let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
                format!("USER_{}", tail)
            }
        };
        Self {
            rank,
            name,
            level: entry.level,
            xp: format_count(entry.xp),
        }
    }
}

/// The overview panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsPanel {
    pub users: String,
    pub messages: String,
    pub leaderboard: Vec<LeaderboardRow>,
}

impl StatsPanel {
    /// Render a stats response, substituting the mock leaderboard when absent
    pub fn from_stats(stats: &DashboardStats) -> Self {
        let entries = stats.leaderboard.clone().unwrap_or_else(mock_leaderboard);
        Self {
            users: format_count(stats.users),
            messages: format_count(stats.messages),
            leaderboard: entries
                .iter()
                .enumerate()
                .map(|(i, entry)| LeaderboardRow::from_entry(i + 1, entry))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_boundaries() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(999_999), "1000.0K");
        assert_eq!(format_count(1_000_000), "1.0M");
    }

    #[test]
    fn test_missing_leaderboard_uses_mock() {
        let panel = StatsPanel::from_stats(&DashboardStats {
            users: 12_500,
            messages: 3,
            leaderboard: None,
        });
        assert_eq!(panel.users, "12.5K");
        assert_eq!(panel.messages, "3");
        assert_eq!(panel.leaderboard.len(), 3);
        assert_eq!(panel.leaderboard[0].name, "Prime");
        assert_eq!(panel.leaderboard[0].level, 99);
        assert_eq!(panel.leaderboard[0].xp, "125.0K");
        assert_eq!(panel.leaderboard[2].rank, 3);
    }

    #[test]
    fn test_empty_leaderboard_is_not_replaced() {
        let panel = StatsPanel::from_stats(&DashboardStats {
            leaderboard: Some(vec![]),
            ..Default::default()
        });
        assert!(panel.leaderboard.is_empty());
    }

    #[test]
    fn test_unnamed_user_uses_id_suffix() {
        let panel = StatsPanel::from_stats(&DashboardStats {
            leaderboard: Some(vec![LeaderboardEntry {
                id: "123456789".to_string(),
                username: None,
                level: 3,
                xp: 50,
            }]),
            ..Default::default()
        });
        assert_eq!(panel.leaderboard[0].name, "USER_6789");
        assert_eq!(panel.leaderboard[0].xp, "50");
    }
}
