//! City list parser
//!
//! Reads a province page. Each `citytr` row links its code and its name to
//! the city page:
//!
//! ```html
//! <tr class="citytr">
//!   <td><a href="42/4202.html">420200000000</a></td>
//!   <td><a href="42/4202.html">黄石市</a></td>
//! </tr>
//! ```

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::config::{compile_selector, SelectorConfig};
use super::context::ExtractContext;
use super::error::ParsingResult;
use super::table_cell::{row_cells, TableCell};
use super::LevelExtractor;
use crate::domain::{AreaCategory, AreaRecord};

/// Parser for the city rows of a province page
#[derive(Debug, Clone)]
pub struct CityListParser {
    row_selector: Selector,
}

impl CityListParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&SelectorConfig::default())
    }

    pub fn with_config(selectors: &SelectorConfig) -> ParsingResult<Self> {
        Ok(Self {
            row_selector: compile_selector("city_row", &selectors.city_row)?,
        })
    }

    /// A city row needs a linked code cell and a linked name cell
    fn city_from_cells(cells: &[TableCell], parent_code: &str) -> Option<AreaRecord> {
        match cells {
            [TableCell::Linked { text: code, href }, TableCell::Linked { text: name, .. }, ..] => {
                Some(AreaRecord::city(name.as_str(), code.as_str(), href.as_str(), parent_code))
            }
            _ => None,
        }
    }
}

impl LevelExtractor for CityListParser {
    fn category(&self) -> AreaCategory {
        AreaCategory::City
    }

    fn extract(&self, document: &Html, context: &ExtractContext) -> Vec<AreaRecord> {
        let Some(parent_code) = context.parent_code() else {
            warn!("City page {} extracted without a parent province, skipping", context.source_page);
            return Vec::new();
        };

        let mut cities = Vec::new();
        for (index, row) in document.select(&self.row_selector).enumerate() {
            let cells = row_cells(row);
            match Self::city_from_cells(&cells, parent_code) {
                Some(city) => cities.push(city),
                None => warn!(
                    "Skipping malformed city row {} on {} (province {}): {:?}",
                    index, context.source_page, parent_code, cells
                ),
            }
        }

        debug!(
            "Found {} cities for province {} on {}",
            cities.len(),
            parent_code,
            context.source_page
        );
        cities
    }
}
