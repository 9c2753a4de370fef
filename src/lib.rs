//! Area Code Spider - administrative division crawler for stats.gov.cn
//!
//! Walks the yearly statistical division code tables of the National Bureau
//! of Statistics (province → city → county) and rebuilds them into flat,
//! parent-linked records.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::{AreaCrawler, CrawlError, CrawlReport, CrawlSettings, CrawlStats};
pub use domain::{AreaCategory, AreaDataset, AreaRecord, ScopeFilter};
pub use infrastructure::{AppConfig, FetchError, HttpClient, PageFetcher};
