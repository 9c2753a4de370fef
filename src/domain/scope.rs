//! Scoped-crawl filter
//!
//! Limits which parents get expanded at the City and County stages. Parents
//! rejected here are never fetched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Province expanded by the development profile (Hubei)
pub const DEVELOPMENT_PROVINCE_CODE: &str = "42";

/// City expanded by the development profile (Huanggang)
pub const DEVELOPMENT_CITY_CODE: &str = "421100000000";

/// Optional allow-list of parent codes per expanded level.
/// `None` at a level means every parent at that level is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    provinces: Option<BTreeSet<String>>,
    cities: Option<BTreeSet<String>>,
}

impl ScopeFilter {
    /// Expand every parent at every level
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Single province and single city, used to keep iterative runs cheap
    pub fn development() -> Self {
        Self::unrestricted()
            .with_provinces([DEVELOPMENT_PROVINCE_CODE])
            .with_cities([DEVELOPMENT_CITY_CODE])
    }

    /// Restrict the City stage to the given province codes
    pub fn with_provinces<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provinces = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the County stage to the given city codes
    pub fn with_cities<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the cities of this province should be fetched
    pub fn allows_province(&self, code: &str) -> bool {
        Self::allows(self.provinces.as_ref(), code)
    }

    /// Whether the counties of this city should be fetched
    pub fn allows_city(&self, code: &str) -> bool {
        Self::allows(self.cities.as_ref(), code)
    }

    pub const fn is_unrestricted(&self) -> bool {
        self.provinces.is_none() && self.cities.is_none()
    }

    fn allows(allowed: Option<&BTreeSet<String>>, code: &str) -> bool {
        allowed.is_none_or(|codes| codes.contains(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_allows_everything() {
        let scope = ScopeFilter::unrestricted();
        assert!(scope.is_unrestricted());
        assert!(scope.allows_province("11"));
        assert!(scope.allows_city("110100000000"));
    }

    #[test]
    fn test_development_scope() {
        let scope = ScopeFilter::development();
        assert!(!scope.is_unrestricted());
        assert!(scope.allows_province("42"));
        assert!(!scope.allows_province("11"));
        assert!(scope.allows_city("421100000000"));
        assert!(!scope.allows_city("420200000000"));
    }

    #[test]
    fn test_single_level_restriction() {
        let scope = ScopeFilter::unrestricted().with_provinces(["11", "12"]);
        assert!(scope.allows_province("12"));
        assert!(!scope.allows_province("13"));
        // cities stay unrestricted
        assert!(scope.allows_city("130100000000"));
    }
}
