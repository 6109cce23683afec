//! Plain table model and its construction from parsed HTML
//!
//! Extraction logic works on these owned rows rather than on DOM nodes, so
//! the same parser serves HTML tables and JSON sub-list pages alike.

use crate::{ConfigError, ConfigResult};
use scraper::{ElementRef, Selector};

/// A header cell with its display text and column span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub text: String,
    pub span: usize,
}

impl HeaderCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self::spanning(text, 1)
    }

    /// Creates a cell covering `span` physical columns (0 is treated as 1)
    pub fn spanning(text: impl Into<String>, span: usize) -> Self {
        Self {
            text: text.into(),
            span: span.max(1),
        }
    }
}

pub type HeaderRow = Vec<HeaderCell>;
pub type BodyRow = Vec<String>;

/// A data table split into header rows and body rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header_rows: Vec<HeaderRow>,
    pub body_rows: Vec<BodyRow>,
}

impl Table {
    /// All header text joined, used to decide whether a table is of interest
    pub fn header_text(&self) -> String {
        self.header_rows
            .iter()
            .flatten()
            .map(|cell| cell.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Collapses runs of whitespace (including newlines) into single spaces
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the normalized text content of an element
pub fn element_text(element: &ElementRef) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Structural selectors used to walk tables, compiled once per parser
#[derive(Debug, Clone)]
pub struct TableSelectors {
    pub(crate) head_rows: Selector,
    pub(crate) body_rows: Selector,
    pub(crate) cells: Selector,
    pub(crate) rows: Selector,
    pub(crate) th: Selector,
    pub(crate) td: Selector,
}

impl TableSelectors {
    pub fn new() -> ConfigResult<Self> {
        Ok(Self {
            head_rows: compile_selector("thead > tr")?,
            body_rows: compile_selector("tbody > tr")?,
            cells: compile_selector("th, td")?,
            rows: compile_selector("tr")?,
            th: compile_selector("th")?,
            td: compile_selector("td")?,
        })
    }
}

/// Parses a CSS selector, reporting failures as configuration errors
pub(crate) fn compile_selector(selector: &str) -> ConfigResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Reads a `<table>` element into header and body rows
///
/// Header rows come from `<thead>`; body rows from `<tbody>` (which the HTML
/// parser inserts when the markup omits it).
pub fn read_table(table: &ElementRef, selectors: &TableSelectors) -> Table {
    let cells = &selectors.cells;

    let header_rows = table
        .select(&selectors.head_rows)
        .map(|row| {
            row.select(cells)
                .map(|cell| {
                    let span = cell
                        .value()
                        .attr("colspan")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(1);
                    HeaderCell::spanning(element_text(&cell), span)
                })
                .collect()
        })
        .collect();

    let body_rows = table
        .select(&selectors.body_rows)
        .map(|row| row.select(cells).map(|cell| element_text(&cell)).collect())
        .collect();

    Table {
        header_rows,
        body_rows,
    }
}
