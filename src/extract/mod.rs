//! Extraction of structured data from registry pages
//!
//! This module contains the schema-agnostic parsing logic:
//! - Label/value field extraction from identity tables
//! - Header-driven column mapping with column-span accounting
//! - Substance table parsing on top of the column mapping
//! - Detail page parsing that ties the above together

pub mod columns;
mod document;
mod fields;
mod substances;
mod table;

pub use columns::{classify_header, map_columns, ColumnMapping, FieldKey};
pub use document::{DetailPage, DetailParser};
pub use fields::{extract_field, read_labeled_rows, LabeledRow};
pub use substances::{is_substance_table, parse_substance_table, parse_table};
pub use table::{normalize_text, read_table, BodyRow, HeaderCell, HeaderRow, Table, TableSelectors};
