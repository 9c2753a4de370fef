//! County list parser
//!
//! Reads a city page. Leaf rows such as urban districts carry plain text,
//! other rows link to a town page that this crawler does not follow:
//!
//! ```html
//! <tr class="countytr"><td>421101000000</td><td>市辖区</td></tr>
//! <tr class="countytr">
//!   <td><a href="11/421102.html">421102000000</a></td>
//!   <td><a href="11/421102.html">黄州区</a></td>
//! </tr>
//! ```
//!
//! Both shapes are read through the cell text, so the link never matters.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::config::{compile_selector, SelectorConfig};
use super::context::ExtractContext;
use super::error::ParsingResult;
use super::table_cell::row_cells;
use super::LevelExtractor;
use crate::domain::{AreaCategory, AreaRecord};

/// Parser for the county rows of a city page
#[derive(Debug, Clone)]
pub struct CountyListParser {
    row_selector: Selector,
}

impl CountyListParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&SelectorConfig::default())
    }

    pub fn with_config(selectors: &SelectorConfig) -> ParsingResult<Self> {
        Ok(Self {
            row_selector: compile_selector("county_row", &selectors.county_row)?,
        })
    }
}

impl LevelExtractor for CountyListParser {
    fn category(&self) -> AreaCategory {
        AreaCategory::County
    }

    fn extract(&self, document: &Html, context: &ExtractContext) -> Vec<AreaRecord> {
        let Some(parent_code) = context.parent_code() else {
            warn!("County page {} extracted without a parent city, skipping", context.source_page);
            return Vec::new();
        };

        let mut counties = Vec::new();
        for (index, row) in document.select(&self.row_selector).enumerate() {
            match row_cells(row).as_slice() {
                [code, name, ..] => counties.push(AreaRecord::county(name.text(), code.text(), parent_code)),
                cells => warn!(
                    "Skipping malformed county row {} on {} (city {}): {:?}",
                    index, context.source_page, parent_code, cells
                ),
            }
        }

        debug!(
            "Found {} counties for city {} on {}",
            counties.len(),
            parent_code,
            context.source_page
        );
        counties
    }
}
