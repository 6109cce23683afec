//! Substance table parsing

use crate::extract::columns::{map_columns, ColumnMapping, FieldKey};
use crate::extract::table::{BodyRow, HeaderRow, Table};
use crate::model::SubstanceEntry;

/// Parses a substance table into entries, one per informative body row
///
/// # Rules
///
/// - The column mapping is rebuilt for every table.
/// - A table whose headers locate no field at all yields nothing.
/// - A row with no cell at the highest mapped index is skipped as malformed.
/// - Empty cells are absent fields; a row with every field absent is dropped.
/// - Output order follows row order; nothing is sorted or deduplicated.
pub fn parse_substance_table(header_rows: &[HeaderRow], body_rows: &[BodyRow]) -> Vec<SubstanceEntry> {
    let mapping = map_columns(header_rows);
    let Some(max_index) = mapping.max_index() else {
        tracing::debug!("No substance columns found in table header, skipping table");
        return Vec::new();
    };

    body_rows
        .iter()
        .filter(|row| row.len() > max_index)
        .map(|row| entry_from_row(&mapping, row))
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Convenience wrapper for a whole [`Table`]
pub fn parse_table(table: &Table) -> Vec<SubstanceEntry> {
    parse_substance_table(&table.header_rows, &table.body_rows)
}

/// Returns true if a table's header looks like a substance table
///
/// The header has to mention CAS and at least one of the volume columns.
pub fn is_substance_table(table: &Table) -> bool {
    let header = table.header_text();
    header.contains("CAS") && (header.contains("입고") || header.contains("사용"))
}

fn entry_from_row(mapping: &ColumnMapping, row: &BodyRow) -> SubstanceEntry {
    let read = |key: FieldKey| {
        mapping
            .get(key)
            .and_then(|index| row.get(index))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
    };

    SubstanceEntry {
        material_name: read(FieldKey::MaterialName),
        cas_number: read(FieldKey::CasNumber),
        annual_input_volume: read(FieldKey::AnnualInput),
        annual_usage_volume: read(FieldKey::AnnualUsage),
    }
}
