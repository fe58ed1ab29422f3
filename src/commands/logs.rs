//! Live signal log

use colored::Colorize;

use crate::commands::build_client;
use crate::config::Config;
use crate::dashboard::Tab;
use crate::error::Result;

/// Open the logs tab and print `ticks` log lines as they arrive
pub async fn watch_logs(config: &Config, ticks: u32) -> Result<()> {
    let client = build_client(config)?;
    let mut view = client.subscribe();
    client.switch_tab(Tab::Logs);

    let mut last_seen: Option<String> = None;
    let mut printed = 0;
    while printed < ticks {
        view.changed().await?;
        let latest = view.borrow_and_update().log_console.back().cloned();
        if latest.is_some() && latest != last_seen {
            if let Some(line) = &latest {
                println!("{}", line.green());
            }
            last_seen = latest;
            printed += 1;
        }
    }

    client.switch_tab(Tab::Overview);
    Ok(())
}
