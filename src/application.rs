//! Application layer
//!
//! Orchestrates fetching and extraction into a complete area dataset.

pub mod area_crawler;

pub use area_crawler::{AreaCrawler, CrawlError, CrawlReport, CrawlSettings, CrawlStats};
