//! Settings commands: show and set

use anyhow::bail;
use colored::Colorize;
use prettytable::{format, row, Table};

use crate::commands::{authenticated_client, open_guild, print_alerts};
use crate::config::Config;
use crate::dashboard::{DashboardClient, SettingKey, SettingsForm};
use crate::error::Result;

/// Parse `key=value` assignments
///
/// # Errors
///
/// Returns error for an assignment without `=` or with an unknown key
///
/// # Examples
///
/// ```
/// use guild_dashboard::commands::settings::parse_assignments;
/// use guild_dashboard::dashboard::SettingKey;
///
/// let parsed = parse_assignments(&["prefix=?".to_string(), "log_channel=".to_string()]).unwrap();
/// assert_eq!(parsed[0], (SettingKey::Prefix, "?".to_string()));
/// assert_eq!(parsed[1], (SettingKey::LogChannel, String::new()));
/// ```
pub fn parse_assignments(values: &[String]) -> Result<Vec<(SettingKey, String)>> {
    values
        .iter()
        .map(|assignment| {
            let Some((key, value)) = assignment.split_once('=') else {
                bail!("Expected KEY=VALUE, got {}", assignment);
            };
            Ok((key.trim().parse::<SettingKey>()?, value.to_string()))
        })
        .collect()
}

/// Print a settings form as a table
pub fn print_form(client: &DashboardClient, form: &SettingsForm) {
    let view = client.view();
    println!("{}", view.customization.title.bold());

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["Key".bold(), "Value".bold()]);
    for (key, value) in form.iter() {
        let value = if value.is_empty() {
            "-".dimmed()
        } else if view.is_highlighted(key) {
            value.green().bold()
        } else {
            value.normal()
        };
        table.add_row(row![key.as_str().cyan(), value]);
    }
    table.printstd();
}

/// Show the settings of a guild
pub async fn show_settings(config: &Config, guild_id: &str, json: bool) -> Result<()> {
    let client = authenticated_client(config).await?;
    open_guild(&client, guild_id).await?;
    let form = client.form();

    if json {
        println!("{}", serde_json::to_string_pretty(&form.to_payload())?);
        return Ok(());
    }

    print_form(&client, &form);
    if let Some(context) = client.guild_context() {
        println!(
            "{} roles, {} channels available for linking",
            context.roles.len(),
            context.channels.len()
        );
    }
    Ok(())
}

/// Change settings of a guild and save the whole form
pub async fn set_settings(config: &Config, guild_id: &str, values: &[String]) -> Result<()> {
    let assignments = parse_assignments(values)?;
    let client = authenticated_client(config).await?;
    open_guild(&client, guild_id).await?;

    for (key, value) in assignments {
        tracing::debug!("Setting {} = {:?}", key, value);
        client.set_field(key, value);
    }

    client.save_settings().await?;
    println!("{}", client.view().controls.save.label.green());
    print_alerts(&client);
    Ok(())
}
