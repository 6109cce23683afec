//! Header-driven column mapping
//!
//! Substance tables do not have a fixed column order or fixed header wording,
//! so the physical column of each semantic field is inferred from header text.
//!
//! # Marker order
//!
//! A header cell is classified by the first marker that matches, checked in
//! this order:
//!
//! | Order | Field | Required substrings |
//! |-------|-------|---------------------|
//! | 1 | [`FieldKey::CasNumber`] | `CAS` |
//! | 2 | [`FieldKey::AnnualInput`] | `연간` and `입고` |
//! | 3 | [`FieldKey::AnnualUsage`] | `연간`, `사용` and `판매` |
//! | 4 | [`FieldKey::MaterialName`] | `물질명` |
//!
//! So a merged cell reading "연간 입고/사용·판매량" maps to annual input, and a
//! cell mentioning CAS is never treated as anything else.

use crate::extract::table::{normalize_text, HeaderRow};

/// Semantic fields located in a substance table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    MaterialName,
    CasNumber,
    AnnualInput,
    AnnualUsage,
}

impl FieldKey {
    fn slot(self) -> usize {
        match self {
            Self::MaterialName => 0,
            Self::CasNumber => 1,
            Self::AnnualInput => 2,
            Self::AnnualUsage => 3,
        }
    }
}

/// Markers in check order; all substrings of a marker must be present
const MARKERS: [(FieldKey, &[&str]); 4] = [
    (FieldKey::CasNumber, &["CAS"]),
    (FieldKey::AnnualInput, &["연간", "입고"]),
    (FieldKey::AnnualUsage, &["연간", "사용", "판매"]),
    (FieldKey::MaterialName, &["물질명"]),
];

/// Mapping from semantic field to physical column index for one table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: [Option<usize>; 4],
}

impl ColumnMapping {
    pub fn get(&self, key: FieldKey) -> Option<usize> {
        self.columns[key.slot()]
    }

    /// Records `key -> column` unless the key is already mapped
    ///
    /// Returns true if the mapping changed.
    pub fn insert_if_absent(&mut self, key: FieldKey, column: usize) -> bool {
        let slot = &mut self.columns[key.slot()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(column);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }

    /// Highest mapped column index, if any key is mapped
    pub fn max_index(&self) -> Option<usize> {
        self.columns.iter().flatten().copied().max()
    }
}

/// Classifies one header text by the first matching marker
pub fn classify_header(text: &str) -> Option<FieldKey> {
    let text = normalize_text(text);
    MARKERS
        .iter()
        .find(|(_, needles)| needles.iter().all(|needle| text.contains(needle)))
        .map(|(key, _)| *key)
}

/// Builds a column mapping from a table's header rows
///
/// Each header row is walked left to right with a physical column cursor
/// that starts at 0 and advances by each cell's span. The first cell to
/// match a field wins; later matches (for example a repeated header row)
/// do not overwrite it.
pub fn map_columns(header_rows: &[HeaderRow]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for row in header_rows {
        let mut cursor = 0;
        for cell in row {
            if let Some(key) = classify_header(&cell.text) {
                mapping.insert_if_absent(key, cursor);
            }
            cursor += cell.span.max(1);
        }
    }

    mapping
}
