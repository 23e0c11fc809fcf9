use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use snapshare_core::blob::BlobRegistry;
use snapshare_core::config::AppConfig;
use snapshare_core::ingest::{ImageInput, IngestOutcome, PhotoIngestor};
use snapshare_core::links::parse_event_ref;

use crate::render::{Render, pluralize};
use crate::utils::tui::create_progress_bar;

pub fn run(config: &AppConfig, event: &str, files: Vec<PathBuf>) -> Result<()> {
    let event_id = parse_event_ref(event)?;
    let store = config.open_store();
    let Some(event) = store.read(&event_id)? else {
        anyhow::bail!("Event '{}' not found", event_id);
    };

    let inputs = files
        .iter()
        .map(|path| read_input(path))
        .collect::<Result<Vec<_>>>()?;
    let images = inputs.iter().filter(|input| input.is_image()).count();

    let ingestor = PhotoIngestor::new(store, BlobRegistry::new());
    let bar = create_progress_bar(images as u64, format!("Uploading to {}", event.name));
    let result = ingestor.ingest_with_progress(&event_id, inputs, |done, _| bar.set_position(done as u64));
    bar.finish_and_clear();

    let outcomes = match result {
        Ok(outcomes) => outcomes,
        Err(err) => {
            print_outcomes(&err.outcomes);
            let kept = err.stored();
            return Err(anyhow::Error::new(err.source).context(format!(
                "Upload stopped; {} {} uploaded before the error were kept",
                kept,
                pluralize("photo", kept)
            )));
        }
    };

    print_outcomes(&outcomes);

    let stored = outcomes.iter().filter(|o| o.photo().is_some()).count();
    println!();
    println!(
        "{} {} {} added to {}",
        "Done:".green(),
        stored,
        pluralize("photo", stored),
        event.name.bold()
    );

    Ok(())
}

fn print_outcomes(outcomes: &[IngestOutcome]) {
    for outcome in outcomes {
        println!("{}", outcome.render());
    }
}

/// Read a file and take its MIME type from the extension.
fn read_input(path: &Path) -> Result<ImageInput> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    Ok(ImageInput::new(name, mime_type, bytes))
}
