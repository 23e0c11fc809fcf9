use std::collections::HashSet;
use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use snapshare_core::config::AppConfig;
use snapshare_core::links::parse_event_ref;
use snapshare_core::poll::PollingSynchronizer;
use tokio::sync::mpsc;
use tracing::warn;

use crate::render::{Render, format_file_size, pluralize};

pub async fn run(config: &AppConfig, event: &str, interval: Option<u64>, once: bool) -> Result<()> {
    let event_id = parse_event_ref(event)?;
    let store = config.open_store();
    let Some(event) = store.read(&event_id)? else {
        anyhow::bail!("Event '{}' not found", event_id);
    };

    let count = event.photos.len();
    let mut header = format!("{} {} {}", event.name.bold(), count, pluralize("photo", count));
    if let Some(date) = event.date {
        header.push_str(&format!(" · {}", date.format("%Y-%m-%d")));
    }
    println!("{}", header);
    println!("{}", format_file_size(event.total_photo_bytes()).dimmed());

    if event.photos.is_empty() {
        println!("{}", "No photos yet".dimmed());
    }
    for photo in &event.photos {
        println!("{}", photo.render());
    }

    if once {
        return Ok(());
    }

    let interval = interval
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.poll_interval());
    if interval.is_zero() {
        anyhow::bail!("--interval must be greater than 0");
    }

    println!();
    println!("{}", "Watching for new photos (Ctrl-C to stop)".dimmed());

    let mut seen: HashSet<String> = event.photos.iter().map(|p| p.id.clone()).collect();
    let (gone_tx, mut gone_rx) = mpsc::unbounded_channel::<()>();

    let handle = PollingSynchronizer::new(store, interval).start(&event_id, move |update| {
        match update {
            Ok(Some(event)) => {
                for photo in event.photos.iter().filter(|p| !seen.contains(&p.id)) {
                    println!("{}", photo.render());
                }
                seen.extend(event.photos.into_iter().map(|p| p.id));
                ControlFlow::Continue(())
            }
            Ok(None) => {
                println!("{}", "The event was deleted".red());
                let _ = gone_tx.send(());
                ControlFlow::Break(())
            }
            Err(err) => {
                warn!(%err, "gallery refresh failed");
                ControlFlow::Continue(())
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = gone_rx.recv() => {}
    }
    handle.cancel();

    Ok(())
}
