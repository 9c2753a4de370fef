//! Extraction context
//!
//! Carries the parent identity into a level extractor so that every record
//! produced from a page is linked to the unit that page belongs to.

/// Context information for extracting one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractContext {
    /// Code of the unit whose page is being extracted; `None` for the home page
    pub parent_code: Option<String>,

    /// Site-relative path of the page, used in log messages
    pub source_page: String,
}

impl ExtractContext {
    /// Context for the home page, which lists the root provinces
    pub fn home(source_page: impl Into<String>) -> Self {
        Self {
            parent_code: None,
            source_page: source_page.into(),
        }
    }

    /// Context for the page of a province or city
    pub fn child_of(parent_code: impl Into<String>, source_page: impl Into<String>) -> Self {
        Self {
            parent_code: Some(parent_code.into()),
            source_page: source_page.into(),
        }
    }

    pub fn parent_code(&self) -> Option<&str> {
        self.parent_code.as_deref()
    }
}
