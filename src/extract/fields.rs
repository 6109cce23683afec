//! Label/value field extraction for key-value tables

use crate::extract::table::{element_text, TableSelectors};
use scraper::ElementRef;

/// One table row holding one or more label/value pairs, left to right
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledRow {
    pub pairs: Vec<(String, String)>,
}

impl LabeledRow {
    pub fn new<L: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (L, V)>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(l, v)| (l.into(), v.into()))
                .collect(),
        }
    }
}

/// Returns the value of the first pair whose label contains `label`
///
/// Rows are scanned in order and, within a row, the left pair before the
/// right one. Matching is by substring because upstream labels carry trailing
/// annotations such as units.
pub fn extract_field<'a>(rows: &'a [LabeledRow], label: &str) -> Option<&'a str> {
    rows.iter()
        .flat_map(|row| row.pairs.iter())
        .find(|(row_label, _)| row_label.contains(label))
        .map(|(_, value)| value.as_str())
}

/// Reads the rows of a key-value table
///
/// Within each `<tr>`, the n-th `<th>` is paired with the n-th `<td>`, so a
/// row rendered as `th td th td` yields two pairs.
pub fn read_labeled_rows(table: &ElementRef, selectors: &TableSelectors) -> Vec<LabeledRow> {
    table
        .select(&selectors.rows)
        .map(|row| {
            let labels = row.select(&selectors.th).map(|cell| element_text(&cell));
            let values = row.select(&selectors.td).map(|cell| element_text(&cell));
            LabeledRow {
                pairs: labels.zip(values).collect(),
            }
        })
        .filter(|row| !row.pairs.is_empty())
        .collect()
}
