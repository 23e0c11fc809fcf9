mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use snapshare_core::RetentionDays;
use snapshare_core::config::AppConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "snapshare")]
#[command(about = "Create photo-sharing events, upload photos and watch live galleries")]
struct Cli {
    /// Read configuration from this file instead of ~/.config/snapshare/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event and print its upload and gallery links
    Create {
        name: String,

        /// Date of the event (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short = 'm', long)]
        description: Option<String>,

        /// How long the event stays open: 1, 3, 7, 14 or 30 days
        #[arg(long)]
        days: Option<RetentionDays>,
    },
    /// List all events
    List,
    /// Show an event's details, links and remaining time
    Show {
        /// Event id, or an upload or gallery link
        event: String,
    },
    /// Delete an event and its photo list
    Delete {
        /// Event id, or an upload or gallery link
        event: String,
    },
    /// Add photos to an event (non-image files are skipped)
    Upload {
        /// Event id, or an upload or gallery link
        event: String,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print an event's photos and keep watching for new ones
    Gallery {
        /// Event id, or an upload or gallery link
        event: String,

        /// Refresh interval in milliseconds (defaults to poll_interval_ms from config)
        #[arg(long)]
        interval: Option<u64>,

        /// Print the current photos and exit
        #[arg(long)]
        once: bool,
    },
    /// Show where snapshare keeps its files, or change a setting
    Config {
        /// Origin used for new upload and gallery links
        #[arg(long)]
        base_url: Option<String>,

        /// Gallery refresh interval in milliseconds
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Retention for new events: 1, 3, 7, 14 or 30 days
        #[arg(long)]
        retention: Option<RetentionDays>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, config_path) = match cli.config {
        Some(path) => (AppConfig::load_from(&path)?, path),
        None => (AppConfig::load()?, AppConfig::config_path()?),
    };

    match cli.command {
        Commands::Create {
            name,
            date,
            description,
            days,
        } => commands::create::run(&config, name, date, description, days),
        Commands::List => commands::list::run(&config),
        Commands::Show { event } => commands::show::run(&config, &event),
        Commands::Delete { event } => commands::delete::run(&config, &event),
        Commands::Upload { event, files } => commands::upload::run(&config, &event, files),
        Commands::Gallery {
            event,
            interval,
            once,
        } => commands::gallery::run(&config, &event, interval, once).await,
        Commands::Config {
            base_url,
            poll_interval,
            retention,
        } => commands::config::run(config, &config_path, base_url, poll_interval, retention),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
