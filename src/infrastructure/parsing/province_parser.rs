//! Province list parser
//!
//! Reads the home page of the yearly code table. Every province is an anchor
//! such as `<a href="11.html">北京市<br></a>`; the page path minus its
//! extension is the province code.

use scraper::{Html, Selector};
use tracing::debug;

use super::config::{compile_selector, SelectorConfig, HTML_EXTENSION};
use super::context::ExtractContext;
use super::error::ParsingResult;
use super::table_cell::element_text;
use super::LevelExtractor;
use crate::domain::{AreaCategory, AreaRecord};

/// Parser for the province links of the home page
#[derive(Debug, Clone)]
pub struct ProvinceListParser {
    link_selector: Selector,
}

impl ProvinceListParser {
    /// Create a parser with the default site selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&SelectorConfig::default())
    }

    pub fn with_config(selectors: &SelectorConfig) -> ParsingResult<Self> {
        Ok(Self {
            link_selector: compile_selector("province_link", &selectors.province_link)?,
        })
    }
}

/// Province code derived from its page path: `"11.html"` becomes `"11"`
pub fn code_from_page(page: &str) -> &str {
    page.strip_suffix(HTML_EXTENSION).unwrap_or(page).trim()
}

impl LevelExtractor for ProvinceListParser {
    fn category(&self) -> AreaCategory {
        AreaCategory::Province
    }

    fn extract(&self, document: &Html, context: &ExtractContext) -> Vec<AreaRecord> {
        let provinces: Vec<AreaRecord> = document
            .select(&self.link_selector)
            .map(|anchor| {
                let name = element_text(anchor);
                let page = anchor.value().attr("href").unwrap_or_default().trim();
                AreaRecord::province(name, code_from_page(page), page)
            })
            .collect();

        debug!("Found {} provinces on {}", provinces.len(), context.source_page);
        provinces
    }
}
