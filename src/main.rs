//! Command-line entry point
//!
//! Usage: `area-code-spider [config.toml]`
//!
//! The dataset is written as JSON to `output.path`, or to stdout when no
//! path is configured. Logs go to stderr and the optional log file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use area_code_spider::infrastructure::config::OutputConfig;
use area_code_spider::infrastructure::{init_logging_with_config, log_system_info};
use area_code_spider::{AppConfig, AreaCrawler, AreaDataset, HttpClient};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();

    let client = HttpClient::with_config(config.http.clone()).context("Failed to create HTTP client")?;
    let crawler = AreaCrawler::from_config(client, &config).context("Failed to create crawler")?;
    let report = crawler.run().await.context("Area crawl failed")?;

    let dangling = report.dataset.dangling_records();
    if !dangling.is_empty() {
        warn!("⚠️ {} records reference a parent missing from the dataset", dangling.len());
        for record in dangling.iter().take(10) {
            warn!("  dangling: {}", record);
        }
    }

    write_dataset(&report.dataset, &config.output)?;
    info!(
        "📦 {} records written ({} pages fetched, {} parents skipped)",
        report.dataset.len(),
        report.stats.pages_fetched,
        report.stats.parents_skipped()
    );
    Ok(())
}

fn write_dataset(dataset: &AreaDataset, output: &OutputConfig) -> Result<()> {
    let json = if output.pretty {
        serde_json::to_string_pretty(dataset)
    } else {
        serde_json::to_string(dataset)
    }
    .context("Failed to serialize dataset")?;

    match &output.path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
            }
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("💾 Dataset saved to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write dataset to stdout")?;
        }
    }
    Ok(())
}
