//! Conversion of chemical sub-list JSON rows into a labelled table
//!
//! Rows arrive as JSON objects. Their keys become header cells, relabelled
//! through the configured key labels, so the same header matching used for
//! HTML tables locates the substance columns.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::extract::{HeaderCell, Table};
use crate::harvest::ChemicalPage;

/// Builds a chemical page from the rows of one sub-list response
///
/// The total row count is read from `total_field` on the first row only, and
/// that key is not turned into a column.
pub fn rows_to_page(
    rows: &[Value],
    key_labels: &BTreeMap<String, String>,
    total_field: &str,
) -> ChemicalPage {
    let objects: Vec<_> = rows.iter().filter_map(Value::as_object).collect();

    let mut keys: Vec<&str> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if key != total_field && !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let header = keys
        .iter()
        .map(|key| HeaderCell::new(key_labels.get(*key).map(String::as_str).unwrap_or(key)))
        .collect();

    let body_rows = objects
        .iter()
        .map(|object| keys.iter().map(|key| value_text(object.get(*key))).collect())
        .collect();

    let total_count = objects
        .first()
        .and_then(|first| first.get(total_field))
        .and_then(parse_count);

    ChemicalPage {
        total_count,
        table: Table {
            header_rows: if keys.is_empty() { Vec::new() } else { vec![header] },
            body_rows,
        },
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Reads a count given either as a JSON number or as a numeric string
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}
