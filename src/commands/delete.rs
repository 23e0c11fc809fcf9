use anyhow::Result;
use owo_colors::OwoColorize;
use snapshare_core::config::AppConfig;
use snapshare_core::links::parse_event_ref;

pub fn run(config: &AppConfig, event: &str) -> Result<()> {
    let event_id = parse_event_ref(event)?;
    let store = config.open_store();
    let existing = store.read(&event_id)?;

    store.delete(&event_id)?;

    match existing {
        Some(event) => println!("{} {}", "Deleted".red(), event.name),
        None => println!("{}", format!("No event '{}' (nothing to delete)", event_id).dimmed()),
    }

    Ok(())
}
