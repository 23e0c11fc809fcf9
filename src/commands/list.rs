use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use snapshare_core::config::AppConfig;

use crate::render::render_event_line;

pub fn run(config: &AppConfig) -> Result<()> {
    let events = config.open_store().list_all()?;

    if events.is_empty() {
        println!("{}", "No events yet. Create one with: snapshare create <name>".dimmed());
        return Ok(());
    }

    let now = Utc::now();
    for event in &events {
        println!("{}", render_event_line(event, now));
    }

    Ok(())
}
