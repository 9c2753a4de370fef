//! Table cell access for listing rows
//!
//! A listing cell either wraps its text in a link to a deeper page or holds
//! plain text (leaf units such as urban districts have no deeper page).

use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};

lazy_static! {
    static ref ANCHOR_SELECTOR: Selector = Selector::parse("a").expect("anchor selector to compile");
}

/// One `<td>` of a listing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCell {
    /// Cell whose content is a link
    Linked { text: String, href: String },
    /// Cell without a link
    PlainText { text: String },
}

impl TableCell {
    /// Read a `<td>` element. The first anchor with an `href` decides the variant.
    pub fn from_element(cell: ElementRef<'_>) -> Self {
        let anchor = cell
            .select(&ANCHOR_SELECTOR)
            .find_map(|a| a.value().attr("href").map(|href| (a, href)));

        match anchor {
            Some((a, href)) => Self::Linked {
                text: element_text(a),
                href: href.trim().to_string(),
            },
            None => Self::PlainText {
                text: element_text(cell),
            },
        }
    }

    /// Trimmed text of the cell, regardless of variant
    pub fn text(&self) -> &str {
        match self {
            Self::Linked { text, .. } | Self::PlainText { text } => text,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Linked { href, .. } => Some(href),
            Self::PlainText { .. } => None,
        }
    }
}

/// Direct `<td>` children of a row, in document order
pub fn row_cells(row: ElementRef<'_>) -> Vec<TableCell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name().eq_ignore_ascii_case("td"))
        .map(TableCell::from_element)
        .collect()
}

/// Concatenated, trimmed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_row(html: &str) -> Vec<TableCell> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("tr").unwrap();
        let row = document.select(&selector).next().unwrap();
        row_cells(row)
    }

    #[test]
    fn test_plain_text_cells() {
        let cells = first_row(
            "<table><tr class='countytr'><td>421101000000</td><td> 市辖区 </td></tr></table>",
        );
        assert_eq!(
            cells,
            vec![
                TableCell::PlainText { text: "421101000000".to_string() },
                TableCell::PlainText { text: "市辖区".to_string() },
            ]
        );
    }

    #[test]
    fn test_linked_cells() {
        let cells = first_row(
            r#"<table><tr class="citytr"><td><a href=" 42/4202.html ">420200000000</a></td><td><a href="42/4202.html">黄石市</a></td></tr></table>"#,
        );
        assert_eq!(cells[0].href(), Some("42/4202.html"));
        assert_eq!(cells[0].text(), "420200000000");
        assert_eq!(cells[1].text(), "黄石市");
    }

    #[test]
    fn test_anchor_without_href_is_plain_text() {
        let cells = first_row("<table><tr><td><a name='x'>110101000000</a></td></tr></table>");
        assert_eq!(cells, vec![TableCell::PlainText { text: "110101000000".to_string() }]);
    }
}
