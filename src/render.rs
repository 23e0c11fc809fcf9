//! Terminal rendering for snapshare types.
//!
//! Extension traits that add colored output to snapshare-core types using
//! owo_colors.

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use snapshare_core::expiry::Remaining;
use snapshare_core::ingest::IngestOutcome;
use snapshare_core::{Event, Photo};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Remaining {
    fn render(&self) -> String {
        match self {
            Remaining::Active { days: 0, .. } => self.to_string().yellow().to_string(),
            Remaining::Active { .. } => self.to_string().green().to_string(),
            Remaining::Expired => self.to_string().red().to_string(),
        }
    }
}

impl Render for Photo {
    fn render(&self) -> String {
        let size = self.size.map(format_file_size).unwrap_or_default();
        format!(
            "  {} {} {}",
            self.name,
            format_timestamp(self.uploaded_at).dimmed(),
            size.dimmed()
        )
    }
}

impl Render for IngestOutcome {
    fn render(&self) -> String {
        match self {
            IngestOutcome::Stored(photo) => format!("{} {}", "+".green(), photo.name),
            IngestOutcome::Skipped { name, mime_type } => {
                let reason = format!("(skipped, {mime_type} is not an image)");
                format!("{} {} {}", "-".yellow(), name, reason.dimmed())
            }
        }
    }
}

/// One line per event, for listings.
pub fn render_event_line(event: &Event, now: DateTime<Utc>) -> String {
    let photos = format!("{} {}", event.photos.len(), pluralize("photo", event.photos.len()));
    format!(
        "{}  {}  {}  {}",
        event.id.dimmed(),
        event.name.bold(),
        photos,
        event.remaining(now).render()
    )
}

/// The full dashboard view of an event.
pub fn render_event_details(event: &Event, now: DateTime<Utc>) -> String {
    let mut lines = vec![event.name.bold().to_string()];

    if let Some(description) = &event.description {
        lines.push(description.clone());
    }
    lines.push(String::new());

    let date = event
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "not set".dimmed().to_string());

    lines.push(format!("   {:<12}{}", "Id", event.id));
    lines.push(format!("   {:<12}{}", "Created", format_timestamp(event.created_at)));
    lines.push(format!("   {:<12}{}", "Date", date));
    lines.push(format!("   {:<12}{}", "Retention", event.max_duration));
    lines.push(format!("   {:<12}{}", "Expires", format_timestamp(event.expires_at())));
    lines.push(format!("   {:<12}{}", "Remaining", event.remaining(now).render()));
    lines.push(format!(
        "   {:<12}{} ({})",
        "Photos",
        event.photos.len(),
        format_file_size(event.total_photo_bytes())
    ));
    lines.push(String::new());
    lines.push(format!("   {:<12}{}", "Upload", event.upload_link.cyan()));
    lines.push(format!("   {:<12}{}", "Gallery", event.gallery_link.cyan()));

    lines.join("\n")
}

/// Sizes in megabytes with one decimal, e.g. "2.4 MB".
pub fn format_file_size(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    format!("{:.1} MB", mb)
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
