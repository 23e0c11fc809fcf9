use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use snapshare_core::RetentionDays;
use snapshare_core::config::AppConfig;

pub fn run(
    mut config: AppConfig,
    config_path: &Path,
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    retention: Option<RetentionDays>,
) -> Result<()> {
    let changed = base_url.is_some() || poll_interval_ms.is_some() || retention.is_some();

    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    if let Some(poll_interval_ms) = poll_interval_ms {
        config.poll_interval_ms = poll_interval_ms;
    }
    if let Some(retention) = retention {
        config.default_retention_days = retention.days();
    }

    if changed {
        config.save(config_path)?;
        println!("{} {}", "Saved".green(), config_path.display());
        println!();
    }

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Events:     {}", config.data_path().display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Links:      {}", config.base_url);
    println!("  Refresh:    {} ms", config.poll_interval_ms);
    println!("  Retention:  {}", config.default_retention()?);

    Ok(())
}
