//! Selector configuration for the three hierarchy levels
//!
//! The defaults encode the known layout of the statistics site: province
//! links sit in cells of `provincetr` rows, and city/county listings are
//! `citytr`/`countytr` table rows whose first cell holds the code and second
//! cell the name.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use super::error::{ParsingError, ParsingResult};

/// File extension of every listing page on the site
pub const HTML_EXTENSION: &str = ".html";

/// CSS selectors used by the level extractors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Anchors on the home page that link to a province page
    pub province_link: String,

    /// Rows of a province page, one per city
    pub city_row: String,

    /// Rows of a city page, one per county
    pub county_row: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            // The published rule marks the cell; the live pages mark the row.
            province_link: r#"td.provincetr > a[href$=".html"], tr.provincetr > td > a[href$=".html"]"#
                .to_string(),
            city_row: "tr.citytr".to_string(),
            county_row: "tr.countytr".to_string(),
        }
    }
}

impl SelectorConfig {
    /// Check that every selector compiles
    pub fn validate(&self) -> ParsingResult<()> {
        compile_selector("province_link", &self.province_link)?;
        compile_selector("city_row", &self.city_row)?;
        compile_selector("county_row", &self.county_row)?;
        Ok(())
    }
}

/// Compile one selector string, naming the config field on failure
pub fn compile_selector(field: &'static str, selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(field, selector, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_compile() {
        assert!(SelectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_selector_names_field() {
        let config = SelectorConfig {
            city_row: "tr..citytr".to_string(),
            ..SelectorConfig::default()
        };

        match config.validate() {
            Err(ParsingError::InvalidSelector { field, selector, .. }) => {
                assert_eq!(field, "city_row");
                assert_eq!(selector, "tr..citytr");
            }
            other => panic!("expected invalid selector error, got {other:?}"),
        }
    }
}
