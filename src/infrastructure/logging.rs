//! Logging system configuration and initialization
//!
//! Console and/or file output through `tracing-subscriber`, optional JSON
//! formatting, and timestamps in China Standard Time (UTC+8), the time zone
//! the statistics site publishes in. `RUST_LOG` overrides the configured
//! filters.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use lazy_static::lazy_static;
use tracing::info;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;

/// Target of this crate's own events
const CRATE_TARGET: &str = "area_code_spider";

const CST_OFFSET_SECONDS: i32 = 8 * 3600;

// Keeps the non-blocking file writer flushing until the process exits
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<WorkerGuard>> = Mutex::new(Vec::new());
}

fn to_cst(time: DateTime<Utc>) -> DateTime<FixedOffset> {
    match FixedOffset::east_opt(CST_OFFSET_SECONDS) {
        Some(offset) => time.with_timezone(&offset),
        None => time.fixed_offset(),
    }
}

/// Time formatter for CST (China Standard Time, UTC+8)
struct CstTimeFormatter;

impl FormatTime for CstTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", to_cst(Utc::now()).format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Configured log directory, or `logs/` next to the executable
pub fn log_directory(config: &LoggingConfig) -> PathBuf {
    if let Some(dir) = &config.directory {
        return dir.clone();
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    exe_dir.join("logs")
}

/// Filter directives derived from the configuration.
///
/// Below trace level the noisy dependency targets are capped by
/// `module_filters`; at trace everything passes.
pub fn filter_directives(config: &LoggingConfig) -> Vec<String> {
    let level = config.level.trim().to_lowercase();
    let mut directives = vec![level.clone()];

    if !level.contains("trace") {
        let mut modules: Vec<_> = config.module_filters.iter().collect();
        modules.sort();
        directives.extend(modules.into_iter().map(|(module, filter)| format!("{module}={filter}")));
    }

    directives.push(format!("{CRATE_TARGET}={level}"));
    directives
}

/// Rename a previous run's log file with its modification time in CST
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str) -> Result<()> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(());
    }

    let modified = std::fs::metadata(&log_file_path)
        .and_then(|metadata| metadata.modified())
        .unwrap_or_else(|_| std::time::SystemTime::now());
    let stamp = to_cst(modified.into()).format("%Y%m%dT%H%M%S");

    let file_stem = log_file_name.trim_end_matches(".log");
    let rotated_path = log_dir.join(format!("{file_stem}.{stamp}.log"));

    std::fs::rename(&log_file_path, &rotated_path).with_context(|| {
        format!(
            "Failed to rotate log file {} to {}",
            log_file_path.display(),
            rotated_path.display()
        )
    })
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Install the global subscriber. Fails when neither output is enabled or a
/// subscriber is already installed.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(config).join(","))
            .with_context(|| format!("Invalid log filter for level '{}'", config.level))?,
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(CstTimeFormatter)
            .with_target(false);
        layers.push(if config.json_format {
            console_layer.json().boxed()
        } else {
            console_layer.boxed()
        });
    }

    let log_dir = log_directory(config);
    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
        rotate_existing_log_file(&log_dir, &config.file_name)?;

        let (file_writer, file_guard) = non_blocking(rolling::never(&log_dir, &config.file_name));
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_timer(CstTimeFormatter)
            .with_ansi(false);
        layers.push(if config.json_format {
            file_layer
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            file_layer.with_target(false).boxed()
        });
    }

    Registry::default()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    info!("📝 Logging initialized (level: {}, json: {})", config.level, config.json_format);
    if config.file_output {
        info!("Log file: {}", log_dir.join(&config.file_name).display());
    }
    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Area Code Spider ===");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_filter_directives_cap_dependencies() {
        let config = LoggingConfig {
            level: "DEBUG".to_string(),
            module_filters: HashMap::from([
                ("reqwest".to_string(), "info".to_string()),
                ("hyper".to_string(), "warn".to_string()),
            ]),
            ..LoggingConfig::default()
        };

        assert_eq!(
            filter_directives(&config),
            vec!["debug", "hyper=warn", "reqwest=info", "area_code_spider=debug"]
        );
    }

    #[test]
    fn test_trace_level_lifts_module_filters() {
        let config = LoggingConfig {
            level: "trace".to_string(),
            ..LoggingConfig::default()
        };

        assert_eq!(filter_directives(&config), vec!["trace", "area_code_spider=trace"]);
    }

    #[test]
    fn test_default_directives_parse() {
        let directives = filter_directives(&LoggingConfig::default()).join(",");
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn test_no_output_is_an_error() {
        let config = LoggingConfig {
            console_output: false,
            file_output: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging_with_config(&config).is_err());
    }

    #[test]
    fn test_configured_directory_wins() {
        let config = LoggingConfig {
            directory: Some(PathBuf::from("/var/log/area-code-spider")),
            ..LoggingConfig::default()
        };
        assert_eq!(log_directory(&config), PathBuf::from("/var/log/area-code-spider"));
        assert!(log_directory(&LoggingConfig::default()).ends_with("logs"));
    }

    #[test]
    fn test_rotation_renames_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("spider.log"), "previous run").unwrap();

        rotate_existing_log_file(dir.path(), "spider.log").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("spider.") && names[0].ends_with(".log"));
        assert_ne!(names[0], "spider.log");
    }

    #[test]
    fn test_cst_is_eight_hours_ahead() {
        let utc = DateTime::parse_from_rfc3339("2023-06-30T16:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(to_cst(utc).format("%Y-%m-%d %H:%M").to_string(), "2023-07-01 00:00");
    }
}
