//! Facility-level record types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A facility as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityReference {
    /// Stable key used for detail lookups
    #[serde(rename = "bplcId", alias = "facilityId")]
    pub facility_id: String,

    /// Facility name as shown in the listing
    #[serde(rename = "bplcNm", alias = "nameHint", default)]
    pub name_hint: String,

    /// Facility address as shown in the listing
    #[serde(rename = "addr", alias = "addressHint", default)]
    pub address_hint: String,
}

impl FacilityReference {
    pub fn new(facility_id: impl Into<String>) -> Self {
        Self {
            facility_id: facility_id.into(),
            name_hint: String::new(),
            address_hint: String::new(),
        }
    }
}

/// One row of a facility's substance table
///
/// Any field may be absent when its column was not located in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubstanceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_input_volume: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_usage_volume: Option<String>,
}

impl SubstanceEntry {
    /// Returns true if no field carries a value
    pub fn is_empty(&self) -> bool {
        self.material_name.is_none()
            && self.cas_number.is_none()
            && self.annual_input_volume.is_none()
            && self.annual_usage_volume.is_none()
    }
}

/// A facility's full record, successful or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityRecord {
    pub facility_id: String,

    /// 1-based position of the facility in the discovered list
    pub sequence: usize,

    /// Listing name, kept for provenance
    pub name_hint: String,

    /// Listing address, kept for provenance
    pub address_hint: String,

    /// Identity fields keyed by label; labels not found are simply absent
    pub identity_fields: BTreeMap<String, String>,

    pub substances: Vec<SubstanceEntry>,

    /// Number of detail attempts made
    pub attempts: u32,

    /// Set when every attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FacilityRecord {
    /// Creates a successful record
    pub fn success(
        facility_id: impl Into<String>,
        identity_fields: BTreeMap<String, String>,
        substances: Vec<SubstanceEntry>,
        attempts: u32,
    ) -> Self {
        Self {
            facility_id: facility_id.into(),
            sequence: 0,
            name_hint: String::new(),
            address_hint: String::new(),
            identity_fields,
            substances,
            attempts,
            error: None,
        }
    }

    /// Creates a failure marker record carrying the last error
    pub fn failure(facility_id: impl Into<String>, error: impl Into<String>, attempts: u32) -> Self {
        Self {
            facility_id: facility_id.into(),
            sequence: 0,
            name_hint: String::new(),
            address_hint: String::new(),
            identity_fields: BTreeMap::new(),
            substances: Vec::new(),
            attempts,
            error: Some(error.into()),
        }
    }

    /// Attaches the listing position and hint fields
    pub fn with_provenance(mut self, sequence: usize, reference: &FacilityReference) -> Self {
        self.sequence = sequence;
        self.name_hint = reference.name_hint.clone();
        self.address_hint = reference.address_hint.clone();
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Best available display name: identity table, then listing hint, then id
    pub fn display_name(&self) -> &str {
        self.identity_fields
            .get(crate::config::FACILITY_NAME_LABEL)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.name_hint.as_str()).filter(|s| !s.is_empty()))
            .unwrap_or(&self.facility_id)
    }
}
