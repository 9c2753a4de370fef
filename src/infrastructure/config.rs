//! Configuration infrastructure
//!
//! Typed application settings, loaded in layers with the `config` crate:
//! compiled-in defaults, `config/default.toml`, the per-user config file,
//! an explicit file given on the command line, then `AREA_SPIDER_*`
//! environment variables. Later layers win.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::ScopeFilter;
use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::parsing::{ParsingError, SelectorConfig};

/// Prefix of environment overrides, e.g. `AREA_SPIDER_CRAWL__PROFILE`
pub const ENV_PREFIX: &str = "AREA_SPIDER";

/// Project-local configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Invalid selector configuration: {source}")]
    Selector {
        #[from]
        source: ParsingError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub crawl: CrawlConfig,
    pub http: HttpClientConfig,
    pub selectors: SelectorConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// Where the yearly code table lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL every page path is resolved against
    pub base_url: String,
    /// Page listing the provinces
    pub home_page: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: stats_gov::BASE_URL.to_string(),
            home_page: stats_gov::HOME_PAGE.to_string(),
        }
    }
}

/// Which parents get expanded when no explicit codes are configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlProfile {
    /// Every province and every city
    #[default]
    Full,
    /// Hubei province and Huanggang city only
    Development,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub profile: CrawlProfile,
    /// Provinces whose cities are crawled; overrides the profile
    pub province_codes: Option<Vec<String>>,
    /// Cities whose counties are crawled; overrides the profile
    pub city_codes: Option<Vec<String>>,
    /// Sibling pages fetched concurrently at one level
    pub max_concurrent_fetches: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            profile: CrawlProfile::default(),
            province_codes: None,
            city_codes: None,
            max_concurrent_fetches: defaults::MAX_CONCURRENT_FETCHES,
        }
    }
}

impl CrawlConfig {
    /// Scope implied by the profile, with explicit code lists taking precedence per level
    pub fn scope_filter(&self) -> ScopeFilter {
        let mut scope = match self.profile {
            CrawlProfile::Full => ScopeFilter::unrestricted(),
            CrawlProfile::Development => ScopeFilter::development(),
        };

        if let Some(codes) = &self.province_codes {
            scope = scope.with_provinces(codes.iter().map(|code| code.trim().to_string()));
        }
        if let Some(codes) = &self.city_codes {
            scope = scope.with_cities(codes.iter().map(|code| code.trim().to_string()));
        }
        scope
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output (stderr, so stdout stays free for the dataset)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for the log file; next to the executable when unset
    pub directory: Option<PathBuf>,

    /// Log file name inside the directory
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            directory: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: HashMap::from([
                ("reqwest".to_string(), "info".to_string()),
                ("hyper".to_string(), "warn".to_string()),
                ("hyper_util".to_string(), "warn".to_string()),
                ("h2".to_string(), "warn".to_string()),
                ("html5ever".to_string(), "warn".to_string()),
                ("selectors".to_string(), "warn".to_string()),
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON destination; stdout when unset
    pub path: Option<PathBuf>,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { path: None, pretty: true }
    }
}

/// One configuration file layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub path: PathBuf,
    pub required: bool,
}

impl ConfigLayer {
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), required: false }
    }

    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), required: true }
    }
}

/// Per-user configuration file under the platform config directory
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(defaults::APP_DIR_NAME).join("config.toml"))
}

impl AppConfig {
    /// Load every layer, with `explicit` as a required file when given
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut layers = vec![ConfigLayer::optional(DEFAULT_CONFIG_FILE)];
        if let Some(user_path) = user_config_path() {
            layers.push(ConfigLayer::optional(user_path));
        }
        if let Some(path) = explicit {
            layers.push(ConfigLayer::required(path));
        }
        Self::load_layers(&layers, None)
    }

    /// Load the given file layers on top of the defaults.
    ///
    /// `env_source` replaces the process environment for the `AREA_SPIDER_`
    /// layer when given.
    pub fn load_layers(
        layers: &[ConfigLayer],
        env_source: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        for layer in layers {
            debug!("Config layer: {} (required: {})", layer.path.display(), layer.required);
            builder = builder.add_source(
                config::File::from(layer.path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(layer.required),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env_source),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the crawler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = Url::parse(&self.site.base_url).map_err(|e| {
            ConfigError::validation(format!("site.base_url '{}' is not a valid URL: {e}", self.site.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::validation(format!(
                "site.base_url must use http or https, got '{}'",
                base.scheme()
            )));
        }
        if self.site.home_page.trim().is_empty() {
            return Err(ConfigError::validation("site.home_page must not be empty"));
        }

        if self.crawl.max_concurrent_fetches == 0 {
            return Err(ConfigError::validation("crawl.max_concurrent_fetches must be at least 1"));
        }
        if self.http.max_requests_per_second == 0 {
            return Err(ConfigError::validation("http.max_requests_per_second must be at least 1"));
        }
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::validation("http.timeout_seconds must be at least 1"));
        }

        if !self.logging.console_output && !self.logging.file_output {
            return Err(ConfigError::validation(
                "logging needs console_output or file_output enabled",
            ));
        }

        self.selectors.validate()?;
        Ok(())
    }
}

/// Constants of the National Bureau of Statistics code tables
pub mod stats_gov {
    /// 2023 edition of the statistical division codes
    pub const BASE_URL: &str = "https://www.stats.gov.cn/sj/tjbz/tjyqhdmhcxhfdm/2023";

    pub const HOME_PAGE: &str = "index.html";
}

/// Default configuration values
pub mod defaults {
    /// One fetch at a time reproduces the sequential crawl
    pub const MAX_CONCURRENT_FETCHES: usize = 1;

    pub const USER_AGENT: &str = concat!(
        "Mozilla/5.0 (compatible; area-code-spider/",
        env!("CARGO_PKG_VERSION"),
        ")"
    );

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const MAX_REQUESTS_PER_SECOND: u32 = 2;

    pub const MAX_RETRIES: u32 = 3;

    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    pub const RETRY_JITTER_MS: u64 = 250;

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_FILE_NAME: &str = "area-code-spider.log";

    pub const APP_DIR_NAME: &str = "area-code-spider";
}
