//! Administrative area records and the flat three-level dataset
//!
//! Records are produced once by the level extractors and never mutated.
//! The hierarchy is not stored as a tree: parent/child relationships are
//! recovered on demand by matching `parent_code` against `code`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchy level of an administrative area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AreaCategory {
    Province,
    City,
    County,
}

impl AreaCategory {
    /// Category whose records are the parents of this one
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Province => None,
            Self::City => Some(Self::Province),
            Self::County => Some(Self::City),
        }
    }

    /// Category listed on the pages of this one, if any
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Province => Some(Self::City),
            Self::City => Some(Self::County),
            Self::County => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Province => "Province",
            Self::City => "City",
            Self::County => "County",
        }
    }
}

impl fmt::Display for AreaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One administrative unit extracted from the statistics site
///
/// `code` is kept as the site publishes it. It is an identifier, not a number,
/// and must never be parsed as one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    category: AreaCategory,
    name: String,
    code: String,
    page: Option<String>,
    parent_code: Option<String>,
}

impl AreaRecord {
    /// Province record; provinces are the roots and carry no parent
    pub fn province(name: impl Into<String>, code: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            category: AreaCategory::Province,
            name: name.into(),
            code: code.into(),
            page: Some(page.into()),
            parent_code: None,
        }
    }

    /// City record listed on a province page
    pub fn city(
        name: impl Into<String>,
        code: impl Into<String>,
        page: impl Into<String>,
        parent_code: impl Into<String>,
    ) -> Self {
        Self {
            category: AreaCategory::City,
            name: name.into(),
            code: code.into(),
            page: Some(page.into()),
            parent_code: Some(parent_code.into()),
        }
    }

    /// County record listed on a city page. Counties have no deeper page.
    pub fn county(name: impl Into<String>, code: impl Into<String>, parent_code: impl Into<String>) -> Self {
        Self {
            category: AreaCategory::County,
            name: name.into(),
            code: code.into(),
            page: None,
            parent_code: Some(parent_code.into()),
        }
    }

    pub const fn category(&self) -> AreaCategory {
        self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Site-relative path of the page listing this unit's children
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    pub fn parent_code(&self) -> Option<&str> {
        self.parent_code.as_deref()
    }

    /// True when `other` is the direct parent of this record
    pub fn is_child_of(&self, other: &Self) -> bool {
        self.category.parent() == Some(other.category) && self.parent_code() == Some(other.code())
    }
}

impl fmt::Display for AreaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.category, self.name, self.code)
    }
}

/// Flat result of a crawl run: one ordered list per hierarchy level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDataset {
    pub provinces: Vec<AreaRecord>,
    pub cities: Vec<AreaRecord>,
    pub counties: Vec<AreaRecord>,
}

impl AreaDataset {
    pub const fn new(provinces: Vec<AreaRecord>, cities: Vec<AreaRecord>, counties: Vec<AreaRecord>) -> Self {
        Self {
            provinces,
            cities,
            counties,
        }
    }

    /// Records of a single level, in extraction order
    pub fn level(&self, category: AreaCategory) -> &[AreaRecord] {
        match category {
            AreaCategory::Province => &self.provinces,
            AreaCategory::City => &self.cities,
            AreaCategory::County => &self.counties,
        }
    }

    /// All records, provinces first, then cities, then counties
    pub fn records(&self) -> impl Iterator<Item = &AreaRecord> {
        self.provinces.iter().chain(&self.cities).chain(&self.counties)
    }

    pub fn len(&self) -> usize {
        self.provinces.len() + self.cities.len() + self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, category: AreaCategory, code: &str) -> Option<&AreaRecord> {
        self.level(category).iter().find(|record| record.code() == code)
    }

    /// Direct children of `parent`, in extraction order
    pub fn children_of<'a>(&'a self, parent: &'a AreaRecord) -> impl Iterator<Item = &'a AreaRecord> + 'a {
        let children: &'a [AreaRecord] = match parent.category().child() {
            Some(category) => self.level(category),
            None => &[],
        };
        children.iter().filter(move |child| child.is_child_of(parent))
    }

    pub fn parent_of(&self, record: &AreaRecord) -> Option<&AreaRecord> {
        let category = record.category().parent()?;
        let parent_code = record.parent_code()?;
        self.find(category, parent_code)
    }

    /// Records whose `parent_code` matches no record of the parent level
    pub fn dangling_records(&self) -> Vec<&AreaRecord> {
        self.cities
            .iter()
            .chain(&self.counties)
            .filter(|record| self.parent_of(record).is_none())
            .collect()
    }
}
