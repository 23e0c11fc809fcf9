use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use snapshare_core::config::AppConfig;
use snapshare_core::{NewEvent, RetentionDays};

pub fn run(
    config: &AppConfig,
    name: String,
    date: Option<NaiveDate>,
    description: Option<String>,
    days: Option<RetentionDays>,
) -> Result<()> {
    let max_duration = match days {
        Some(days) => days,
        None => config.default_retention()?,
    };

    let mut new_event = NewEvent::new(name).with_max_duration(max_duration);
    if let Some(date) = date {
        new_event = new_event.with_date(date);
    }
    if let Some(description) = description {
        new_event = new_event.with_description(description);
    }

    let event = config.open_store().create(new_event)?;

    println!("{} {}", "Created".green(), event.name.bold());
    println!("   {:<12}{}", "Id", event.id);
    println!("   {:<12}{}", "Open for", event.max_duration);
    println!();
    println!("   {:<12}{}", "Upload", event.upload_link.cyan());
    println!("   {:<12}{}", "Gallery", event.gallery_link.cyan());
    println!();
    println!(
        "{}",
        "Share the upload link with everyone at the event. No sign-up needed.".dimmed()
    );

    Ok(())
}
