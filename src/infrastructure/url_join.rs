//! URL joining for site-relative page paths
//!
//! Pages on the statistics site link to each other with paths relative to the
//! site root of the yearly table, so every page is resolved against the same
//! base URL rather than against the page that linked to it.

/// Join path segments into one URL.
///
/// Leading and trailing slashes are stripped from every segment and the
/// segments are joined with a single `/`. Nothing is validated: malformed
/// input yields a malformed URL.
///
/// ```
/// use area_code_spider::infrastructure::url_join::join_url;
///
/// assert_eq!(join_url(["https://host/base/", "/11.html"]), "https://host/base/11.html");
/// ```
pub fn join_url<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|segment| segment.as_ref().trim_matches('/').to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a site-relative page path against the base URL
pub fn resolve_page_url(base_url: &str, page: &str) -> String {
    join_url([base_url, page])
}
