//! Session commands: login, logout, whoami

use anyhow::bail;
use colored::Colorize;
use prettytable::{format, row, Table};
use url::Url;

use crate::commands::{authenticated_client, build_client};
use crate::config::Config;
use crate::dashboard::AuthState;
use crate::error::Result;
use crate::session::token_from_redirect;

/// Store a session token and confirm it with the backend
///
/// The token comes from `--token`, from the `session_token` parameter of a
/// login redirect URL, or from standard input.
///
/// # Errors
///
/// Returns error when no token was supplied or the backend rejects it. A
/// rejected token is removed from storage again.
pub async fn login(config: &Config, url: Option<String>, token: Option<String>) -> Result<()> {
    let token = match (url, token) {
        (Some(url), _) => {
            let url = Url::parse(&url)?;
            match token_from_redirect(&url) {
                Some(token) => token,
                None => bail!("The URL carries no session_token parameter"),
            }
        }
        (None, Some(token)) => token,
        (None, None) => read_token_from_stdin()?,
    };

    let client = build_client(config)?;
    match client.bootstrap(Some(token)).await {
        AuthState::Authenticated => {
            let name = client.user().map(|u| u.name).unwrap_or_default();
            println!("{} Signed in as {}", "✓".green(), name.bold());
            Ok(())
        }
        _ => bail!("The backend did not accept this session token"),
    }
}

fn read_token_from_stdin() -> Result<String> {
    eprint!("Session token: ");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let token = line.trim().to_string();
    if token.is_empty() {
        bail!("No session token given");
    }
    Ok(token)
}

/// Forget the stored session token
pub fn logout(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    client.logout();
    println!("{}", "Signed out.".green());
    Ok(())
}

/// Show the signed-in user
pub async fn whoami(config: &Config, json: bool) -> Result<()> {
    let client = authenticated_client(config).await?;
    let view = client.view();

    if json {
        let out = serde_json::json!({
            "user": client.user(),
            "avatar_url": view.avatar_url,
            "managed_guilds": client.managed_guilds().len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(row![
        "User".bold(),
        view.user_name.unwrap_or_default()
    ]);
    if let Some(user) = client.user() {
        table.add_row(row!["ID".bold(), user.id]);
    }
    table.add_row(row![
        "Avatar".bold(),
        view.avatar_url.unwrap_or_default()
    ]);
    table.add_row(row![
        "Managed guilds".bold(),
        client.managed_guilds().len()
    ]);
    table.printstd();
    Ok(())
}
