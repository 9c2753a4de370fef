//! HTML extraction for the administrative division pages
//!
//! One parser per hierarchy level, each turning a parsed listing page into
//! the records it describes. Parsers are pure: the same document and context
//! always produce the same records, in document order.

pub mod error;
pub mod config;
pub mod context;
pub mod table_cell;
pub mod province_parser;
pub mod city_parser;
pub mod county_parser;

// Re-export public types
pub use error::{ParsingError, ParsingResult};
pub use config::SelectorConfig;
pub use context::ExtractContext;
pub use table_cell::TableCell;
pub use province_parser::ProvinceListParser;
pub use city_parser::CityListParser;
pub use county_parser::CountyListParser;

use scraper::Html;

use crate::domain::{AreaCategory, AreaRecord};

/// Level-specific extraction rule
///
/// A selector that matches nothing yields an empty list; that is how a
/// parent without children looks, so it is not an error.
pub trait LevelExtractor: Send + Sync {
    /// Category of the records this extractor produces
    fn category(&self) -> AreaCategory;

    /// Extract every record listed on the page
    fn extract(&self, document: &Html, context: &ExtractContext) -> Vec<AreaRecord>;

    /// Parse raw HTML and extract in one step
    fn extract_html(&self, html: &str, context: &ExtractContext) -> Vec<AreaRecord> {
        let document = Html::parse_document(html);
        self.extract(&document, context)
    }
}

/// The three extractors, compiled from one selector configuration
#[derive(Debug, Clone)]
pub struct LevelExtractors {
    pub province: ProvinceListParser,
    pub city: CityListParser,
    pub county: CountyListParser,
}

impl LevelExtractors {
    pub fn with_config(selectors: &SelectorConfig) -> ParsingResult<Self> {
        Ok(Self {
            province: ProvinceListParser::with_config(selectors)?,
            city: CityListParser::with_config(selectors)?,
            county: CountyListParser::with_config(selectors)?,
        })
    }
}
