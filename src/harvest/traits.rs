use std::future::Future;
use std::time::Duration;

use crate::extract::Table;
use crate::model::FacilityReference;
use crate::Result;

/// Fetches one page of the facility listing for a substance query.
pub trait ListingFetcher: Send + Sync {
    /// Returns the facilities on `page` (1-based); an empty page ends pagination.
    fn fetch_page(
        &self,
        query: &str,
        year: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<FacilityReference>>> + Send;
}

/// Fetches the raw HTML detail document of one facility.
pub trait DetailFetcher: Send + Sync {
    fn fetch_detail(
        &self,
        facility_id: &str,
        year: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// One page of a facility's chemical sub-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChemicalPage {
    /// Total row count declared by the server (first row of the first page)
    pub total_count: Option<u64>,

    /// Rows of the page as a table, with labelled header cells
    pub table: Table,
}

impl ChemicalPage {
    pub fn is_empty(&self) -> bool {
        self.table.body_rows.is_empty()
    }
}

/// Fetches one page of a facility's chemical sub-list.
pub trait ChemicalFetcher: Send + Sync {
    fn fetch_chemical_page(
        &self,
        facility_id: &str,
        year: &str,
        page_index: u32,
        page_unit: u32,
    ) -> impl Future<Output = Result<ChemicalPage>> + Send;
}

/// Suspends the current task; injected so retry and pacing can be tested
/// without real delays.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
