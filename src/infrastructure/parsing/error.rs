//! Parsing error types
//!
//! Extraction itself never fails: a selector that matches nothing means the
//! page has no children, and malformed rows are skipped. What can fail is
//! turning the configured selector strings into compiled selectors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector for {field}: '{selector}' - {reason}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        reason: String,
    },
}

impl ParsingError {
    /// Create an invalid selector error for a configured selector field
    pub fn invalid_selector(field: &'static str, selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            field,
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
