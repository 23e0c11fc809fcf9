use anyhow::Result;
use chrono::Utc;
use snapshare_core::config::AppConfig;
use snapshare_core::links::parse_event_ref;

use crate::render::render_event_details;

pub fn run(config: &AppConfig, event: &str) -> Result<()> {
    let event_id = parse_event_ref(event)?;
    let Some(event) = config.open_store().read(&event_id)? else {
        anyhow::bail!("Event '{}' not found", event_id);
    };

    println!("{}", render_event_details(&event, Utc::now()));
    Ok(())
}
