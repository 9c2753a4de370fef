//! Crawl orchestrator for the province → city → county page tree
//!
//! Levels are processed strictly in order: the city stage starts only once
//! the province list is complete, and the county stage only once the city
//! list is complete. Within a level, sibling pages may be fetched
//! concurrently up to `max_concurrent_fetches`; results are reassembled in
//! parent order, so completion order never leaks into the dataset.

use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{AreaCategory, AreaDataset, AreaRecord, ScopeFilter};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::{FetchError, PageFetcher};
use crate::infrastructure::parsing::{ExtractContext, LevelExtractor, LevelExtractors, ParsingError};
use crate::infrastructure::url_join::resolve_page_url;

/// Run-level failure
#[derive(Error, Debug)]
pub enum CrawlError {
    /// A listing page could not be fetched; the run is aborted
    #[error("Failed to fetch {page} ({url}) while extracting {level} records: {source}")]
    Fetch {
        level: AreaCategory,
        page: String,
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Invalid crawler configuration: {0}")]
    Configuration(#[from] ParsingError),
}

impl CrawlError {
    /// Relative page path of the failed fetch
    pub fn page(&self) -> Option<&str> {
        match self {
            Self::Fetch { page, .. } => Some(page),
            Self::Configuration(_) => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Fetch { url, .. } => Some(url),
            Self::Configuration(_) => None,
        }
    }
}

/// What to crawl and how hard to push the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    pub base_url: String,
    pub home_page: String,
    pub scope: ScopeFilter,
    /// Upper bound on outstanding fetches within one level
    pub max_concurrent_fetches: usize,
}

impl CrawlSettings {
    pub fn new(base_url: impl Into<String>, home_page: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            home_page: home_page.into(),
            scope: ScopeFilter::unrestricted(),
            max_concurrent_fetches: 1,
        }
    }

    pub fn with_scope(mut self, scope: ScopeFilter) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches;
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.site.base_url.as_str(), config.site.home_page.as_str())
            .with_scope(config.crawl.scope_filter())
            .with_max_concurrent_fetches(config.crawl.max_concurrent_fetches)
    }
}

/// Counters collected during one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub pages_fetched: usize,
    /// Provinces whose city page was not fetched because of the scope
    pub provinces_skipped: usize,
    /// Cities whose county page was not fetched because of the scope
    pub cities_skipped: usize,
}

impl CrawlStats {
    pub const fn parents_skipped(&self) -> usize {
        self.provinces_skipped + self.cities_skipped
    }
}

/// Dataset of one run plus its statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub dataset: AreaDataset,
    pub stats: CrawlStats,
}

/// Records extracted from the children pages of one level
struct LevelOutcome {
    records: Vec<AreaRecord>,
    pages_fetched: usize,
    parents_skipped: usize,
}

/// Walks the page tree with a [`PageFetcher`] and the three level extractors
pub struct AreaCrawler<F> {
    fetcher: F,
    extractors: LevelExtractors,
    settings: CrawlSettings,
}

impl<F: PageFetcher> AreaCrawler<F> {
    pub fn new(fetcher: F, extractors: LevelExtractors, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            extractors,
            settings,
        }
    }

    /// Compile the configured selectors and take scope and site from the configuration
    pub fn from_config(fetcher: F, config: &AppConfig) -> Result<Self, CrawlError> {
        let extractors = LevelExtractors::with_config(&config.selectors)?;
        Ok(Self::new(fetcher, extractors, CrawlSettings::from_config(config)))
    }

    pub const fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawl all three levels. The first failed fetch aborts the run.
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let timer = Instant::now();

        info!(
            "🚀 Starting area crawl of {} (scope: {}, concurrency: {})",
            self.settings.base_url,
            if self.settings.scope.is_unrestricted() { "full" } else { "restricted" },
            self.concurrency()
        );

        let home_page = self.settings.home_page.as_str();
        let provinces = self
            .crawl_page(&self.extractors.province, home_page, ExtractContext::home(home_page))
            .await?;
        info!("🏛️ Province stage complete: {} provinces", provinces.len());

        let cities = self
            .expand_level(&self.extractors.city, &provinces, |code| {
                self.settings.scope.allows_province(code)
            })
            .await?;
        info!(
            "🏙️ City stage complete: {} cities from {} province pages ({} skipped)",
            cities.records.len(),
            cities.pages_fetched,
            cities.parents_skipped
        );

        let counties = self
            .expand_level(&self.extractors.county, &cities.records, |code| {
                self.settings.scope.allows_city(code)
            })
            .await?;
        info!(
            "🏘️ County stage complete: {} counties from {} city pages ({} skipped)",
            counties.records.len(),
            counties.pages_fetched,
            counties.parents_skipped
        );

        let stats = CrawlStats {
            started_at,
            elapsed_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
            pages_fetched: 1 + cities.pages_fetched + counties.pages_fetched,
            provinces_skipped: cities.parents_skipped,
            cities_skipped: counties.parents_skipped,
        };
        let dataset = AreaDataset::new(provinces, cities.records, counties.records);

        info!(
            "✅ Crawl finished: {} provinces, {} cities, {} counties from {} pages in {}ms",
            dataset.provinces.len(),
            dataset.cities.len(),
            dataset.counties.len(),
            stats.pages_fetched,
            stats.elapsed_ms
        );

        Ok(CrawlReport { dataset, stats })
    }

    fn concurrency(&self) -> usize {
        self.settings.max_concurrent_fetches.max(1)
    }

    /// Fetch one page and run the extractor over it
    async fn crawl_page(
        &self,
        extractor: &dyn LevelExtractor,
        page: &str,
        context: ExtractContext,
    ) -> Result<Vec<AreaRecord>, CrawlError> {
        let url = resolve_page_url(&self.settings.base_url, page);
        debug!("Fetching {} page {}", extractor.category(), url);

        let html = match self.fetcher.fetch_text(&url).await {
            Ok(html) => html,
            Err(source) => {
                error!("❌ Fetch failed for {}: {}", url, source);
                return Err(CrawlError::Fetch {
                    level: extractor.category(),
                    page: page.to_string(),
                    url,
                    source,
                });
            }
        };

        Ok(extractor.extract_html(&html, &context))
    }

    /// Fetch the children page of every parent the scope allows
    async fn expand_level(
        &self,
        extractor: &dyn LevelExtractor,
        parents: &[AreaRecord],
        allows: impl Fn(&str) -> bool,
    ) -> Result<LevelOutcome, CrawlError> {
        let mut parents_skipped = 0;
        let mut retained = Vec::with_capacity(parents.len());
        for parent in parents {
            match parent.page() {
                Some(page) if allows(parent.code()) => retained.push((parent.code(), page)),
                Some(_) => parents_skipped += 1,
                None => warn!("{} has no children page, skipping", parent),
            }
        }

        if parents_skipped > 0 {
            debug!(
                "Scope skips {} of {} parents for the {} stage",
                parents_skipped,
                parents.len(),
                extractor.category()
            );
        }

        let pages_fetched = retained.len();
        let per_parent: Vec<Vec<AreaRecord>> = stream::iter(retained)
            .map(move |(parent_code, page)| {
                self.crawl_page(extractor, page, ExtractContext::child_of(parent_code, page))
            })
            .buffered(self.concurrency())
            .try_collect()
            .await?;

        Ok(LevelOutcome {
            records: per_parent.into_iter().flatten().collect(),
            pages_fetched,
            parents_skipped,
        })
    }
}
