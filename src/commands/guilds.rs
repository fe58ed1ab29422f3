//! Guild commands: list, invite, trigger, stats

use anyhow::bail;
use colored::Colorize;
use prettytable::{format, row, Table};

use crate::commands::{authenticated_client, build_client, open_guild, print_alerts};
use crate::config::Config;
use crate::dashboard::guilds::{is_managed, GuildCard, EMPTY_GUILDS_TEXT};
use crate::dashboard::{GuildListView, TriggerOutcome};
use crate::error::Result;

/// List the guilds the user manages
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `json` - Print JSON instead of a table
/// * `all` - Include guilds the user cannot manage
pub async fn list_guilds(config: &Config, json: bool, all: bool) -> Result<()> {
    let client = authenticated_client(config).await?;

    let cards: Vec<(GuildCard, bool)> = if all {
        client
            .all_guilds()
            .iter()
            .map(|g| (GuildCard::from_guild(g), is_managed(g.permissions)))
            .collect()
    } else {
        match client.view().guilds {
            GuildListView::Cards(cards) => cards.into_iter().map(|c| (c, true)).collect(),
            GuildListView::Empty | GuildListView::NotLoaded => Vec::new(),
        }
    };

    if json {
        let out: Vec<_> = cards
            .iter()
            .map(|(card, managed)| {
                serde_json::json!({
                    "id": card.id,
                    "name": card.name,
                    "icon_url": card.icon_url,
                    "bot_present": card.bot_present,
                    "tag": card.tag(),
                    "managed": managed,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!("{}", EMPTY_GUILDS_TEXT.yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["ID".bold(), "Name".bold(), "Status".bold()]);
    for (card, managed) in &cards {
        let tag = if !managed {
            "NOT MANAGED".dimmed()
        } else if card.bot_present {
            card.tag().green()
        } else {
            card.tag().yellow()
        };
        table.add_row(row![card.id.cyan(), card.name, tag]);
    }
    table.printstd();
    Ok(())
}

/// Print the bot invite link of a guild
pub async fn invite(config: &Config, guild_id: &str) -> Result<()> {
    let client = build_client(config)?;
    match client.invite(guild_id).await {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => bail!("Could not resolve an invite link for guild {}", guild_id),
    }
}

/// Ask the bot to run `action` in a guild
pub async fn trigger(config: &Config, guild_id: &str, action: &str) -> Result<()> {
    let client = authenticated_client(config).await?;
    open_guild(&client, guild_id).await?;

    match client.trigger_action(action).await {
        Some(TriggerOutcome::Sent) => {
            println!("{} {}", "✓ SENT".green(), action);
            Ok(())
        }
        Some(TriggerOutcome::Rejected(error)) => bail!(
            "Action {} was rejected: {}",
            action,
            error.unwrap_or_else(|| "no reason given".to_string())
        ),
        Some(TriggerOutcome::Failed) => bail!("Action {} could not be sent", action),
        None => bail!("No active guild"),
    }
}

/// Show bot statistics and the leaderboard
pub async fn stats(config: &Config, json: bool) -> Result<()> {
    let client = authenticated_client(config).await?;
    let panel = match client.view().stats {
        Some(panel) => panel,
        None => match client.fetch_stats().await {
            Some(panel) => panel,
            None => bail!("Statistics are unavailable"),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&panel)?);
        return Ok(());
    }

    println!("{} {}", "Users:".bold(), panel.users);
    println!("{} {}", "Messages:".bold(), panel.messages);
    println!();

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["#".bold(), "User".bold(), "Level".bold(), "XP".bold()]);
    for entry in &panel.leaderboard {
        let rank = format!("#{}", entry.rank);
        let rank = if entry.rank == 1 {
            rank.yellow()
        } else {
            rank.cyan()
        };
        table.add_row(row![
            rank,
            entry.name,
            format!("LVL {}", entry.level),
            format!("{} XP", entry.xp)
        ]);
    }
    table.printstd();
    print_alerts(&client);
    Ok(())
}
