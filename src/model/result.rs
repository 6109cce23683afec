//! Run-level result types

use crate::model::FacilityRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata describing one harvest run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    /// Substance identifier queried (name or CAS number)
    pub substance_query: String,
    pub year: String,
    pub requested: usize,
    /// Facilities discovered by pagination
    pub discovered: usize,
    /// Records actually produced (lower than discovered after cancellation)
    pub obtained: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Why pagination stopped early, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_interrupted: Option<String>,
    pub cancelled: bool,
    pub config_hash: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// The consolidated dataset handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    pub metadata: RunMetadata,
    pub records: Vec<FacilityRecord>,
}

impl CrawlResult {
    /// Builds a result, deriving the counts from the records
    pub fn new(mut metadata: RunMetadata, records: Vec<FacilityRecord>) -> Self {
        metadata.obtained = records.len();
        metadata.succeeded = records.iter().filter(|r| r.is_success()).count();
        metadata.failed = metadata.obtained - metadata.succeeded;
        Self { metadata, records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &FacilityRecord> {
        self.records.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FacilityRecord> {
        self.records.iter().filter(|r| !r.is_success())
    }
}
