//! AI commands: architect plans and audits

use colored::Colorize;

use crate::commands::settings::print_form;
use crate::commands::{authenticated_client, open_guild, print_alerts};
use crate::config::Config;
use crate::dashboard::ai::SuggestionEntry;
use crate::error::Result;

/// Ask the AI architect for a plan, optionally executing it
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `guild_id` - Guild to plan for
/// * `prompt` - Description of the desired server architecture
/// * `execute` - Execute the plan once it is generated
pub async fn plan(config: &Config, guild_id: &str, prompt: &str, execute: bool) -> Result<()> {
    let client = authenticated_client(config).await?;
    open_guild(&client, guild_id).await?;

    let entries = client.propose_plan(prompt).await?;
    println!("{}", client.view().controls.architect.label.green().bold());
    for entry in &entries {
        println!("  {}", entry);
    }

    if !execute {
        println!();
        println!(
            "Run again with {} to build it.",
            "--execute".cyan()
        );
        return Ok(());
    }

    client.execute_plan().await?;
    println!("{}", client.view().controls.execute.label.green().bold());
    print_alerts(&client);
    Ok(())
}

/// Run the AI audit, optionally applying and saving its links
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `guild_id` - Guild to audit
/// * `apply` - Fill the form with the suggested links
/// * `save` - Save the form after applying
pub async fn audit(config: &Config, guild_id: &str, apply: bool, save: bool) -> Result<()> {
    let client = authenticated_client(config).await?;
    open_guild(&client, guild_id).await?;

    let entries = client.audit().await?;
    let reasoning = client.view().suggestion_modal.reasoning;
    if !reasoning.is_empty() {
        println!("{}", reasoning.italic());
        println!();
    }
    for entry in &entries {
        match entry {
            SuggestionEntry::Section { title } => {
                println!();
                println!("{}", title.yellow().bold());
            }
            SuggestionEntry::Link { .. } => println!("  {} {}", "🔗".cyan(), entry),
            SuggestionEntry::Missing { .. } => println!("  {}", entry.to_string().yellow()),
            SuggestionEntry::RoleColor { .. } => println!("  {}", entry),
        }
    }

    if !apply {
        client.dismiss_suggestions();
        return Ok(());
    }

    if let Some(applied) = client.apply_suggestions() {
        if let Some(background) = applied.background {
            if let Err(e) = background.await {
                tracing::warn!("Role color update task failed: {}", e);
            }
        }
    }
    println!();
    print_alerts(&client);
    print_form(&client, &client.form());

    if save {
        client.save_settings().await?;
        println!("{}", client.view().controls.save.label.green());
    }
    Ok(())
}
