//! Infrastructure layer: page fetching, HTML extraction, configuration and logging

pub mod url_join;
pub mod http_client;
pub mod parsing;
pub mod config;
pub mod logging;

// Re-export commonly used items
pub use url_join::{join_url, resolve_page_url};
pub use http_client::{FetchError, HttpClient, HttpClientConfig, PageFetcher};
pub use parsing::{
    CityListParser, CountyListParser, ExtractContext, LevelExtractor, LevelExtractors, ParsingError,
    ParsingResult, ProvinceListParser, SelectorConfig,
};
pub use config::{stats_gov, AppConfig, ConfigError, ConfigLayer, CrawlConfig, CrawlProfile};
pub use logging::{init_logging, init_logging_with_config, log_system_info, LoggingConfig};
