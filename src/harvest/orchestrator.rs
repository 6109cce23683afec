//! Harvest orchestration - discovery followed by sequential detail retrieval

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::extract::DetailParser;
use crate::harvest::detail::{ChemicalPaging, DetailRetriever, RetryPolicy};
use crate::harvest::paginator::Paginator;
use crate::harvest::traits::{ChemicalFetcher, DetailFetcher, ListingFetcher, Sleeper, TokioSleeper};
use crate::model::{CrawlResult, RunMetadata};
use crate::Result;

/// Tunables of a harvest run that do not vary per query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSettings {
    pub page_size: u32,
    pub max_stalled_pages: u32,
    pub max_listing_pages: u32,
    pub retry: RetryPolicy,
    pub chemical: ChemicalPaging,
    /// Hash of the configuration, recorded in the run metadata
    pub config_hash: String,
}

impl HarvestSettings {
    pub fn from_config(config: &Config, config_hash: impl Into<String>) -> Self {
        Self {
            page_size: config.listing.page_size,
            max_stalled_pages: config.listing.max_stalled_pages,
            max_listing_pages: config.listing.max_pages,
            retry: RetryPolicy::from_config(&config.detail),
            chemical: ChemicalPaging::from_config(&config.chemical),
            config_hash: config_hash.into(),
        }
    }
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_stalled_pages: 3,
            max_listing_pages: 1000,
            retry: RetryPolicy::default(),
            chemical: ChemicalPaging::default(),
            config_hash: String::new(),
        }
    }
}

/// Main harvest orchestrator
///
/// Owns the connection context (`client`) and lends it to the paginator and
/// the detail retriever. Facilities are retrieved one at a time, in discovery
/// order, with a fixed pause between them.
pub struct Harvester<C, S = TokioSleeper> {
    client: C,
    sleeper: S,
    parser: DetailParser,
    settings: HarvestSettings,
    cancel: CancellationToken,
}

impl<C> Harvester<C, TokioSleeper>
where
    C: ListingFetcher + DetailFetcher + ChemicalFetcher,
{
    /// Creates a harvester using real timers
    pub fn from_config(client: C, config: &Config, config_hash: impl Into<String>) -> Result<Self> {
        let parser = DetailParser::from_config(&config.detail)?;
        Ok(Self::new(
            client,
            TokioSleeper,
            parser,
            HarvestSettings::from_config(config, config_hash),
        ))
    }
}

impl<C, S> Harvester<C, S>
where
    C: ListingFetcher + DetailFetcher + ChemicalFetcher,
    S: Sleeper,
{
    pub fn new(client: C, sleeper: S, parser: DetailParser, settings: HarvestSettings) -> Self {
        Self {
            client,
            sleeper,
            parser,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token observed between facilities
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns a handle that cancels the run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs a complete harvest for one substance and year
    ///
    /// 1. Paginate the listing for up to `max_companies` facilities
    /// 2. Return an empty result if nothing matched
    /// 3. Retrieve each facility in order, pausing `inter_request_delay`
    ///    between facilities (not after the last)
    /// 4. Attach listing hints to each record; failed facilities are kept
    ///
    /// Cancellation is checked before each facility and interrupts retry
    /// and inter-facility pauses; records collected so far are returned with
    /// `cancelled` set.
    ///
    /// # Errors
    ///
    /// Only a failure of the very first listing request is an error
    /// (`HarvestError::Unreachable`).
    pub async fn run(
        &self,
        query: &str,
        year: &str,
        max_companies: usize,
        inter_request_delay: Duration,
    ) -> Result<CrawlResult> {
        let started_at = Utc::now();
        tracing::info!(
            "Searching facilities reporting '{}' in {} (max {})",
            query,
            year,
            max_companies
        );

        let listing = Paginator::new(&self.client)
            .with_limits(self.settings.max_stalled_pages, self.settings.max_listing_pages)
            .fetch_all(query, year, self.settings.page_size, max_companies)
            .await?;

        let total = listing.items.len();
        tracing::info!(
            "Found {} facilities over {} listing pages",
            total,
            listing.pages_fetched
        );

        let mut metadata = RunMetadata {
            substance_query: query.to_string(),
            year: year.to_string(),
            requested: max_companies,
            discovered: total,
            obtained: 0,
            succeeded: 0,
            failed: 0,
            listing_interrupted: listing.interrupted,
            cancelled: false,
            config_hash: self.settings.config_hash.clone(),
            started_at,
            finished_at: started_at,
        };

        if total == 0 {
            tracing::info!("No facilities matched '{}'", query);
            metadata.finished_at = Utc::now();
            return Ok(CrawlResult::new(metadata, Vec::new()));
        }

        let retriever = DetailRetriever::new(
            &self.client,
            &self.sleeper,
            &self.parser,
            self.settings.retry,
            self.settings.chemical,
        )
        .with_cancellation(&self.cancel);

        let mut records = Vec::with_capacity(total);
        for (index, reference) in listing.items.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "Harvest cancelled after {} of {} facilities",
                    records.len(),
                    total
                );
                metadata.cancelled = true;
                break;
            }

            let sequence = index + 1;
            tracing::info!("[{}/{}] Fetching facility {}", sequence, total, reference.facility_id);

            let record = retriever
                .fetch_detail(&reference.facility_id, year)
                .await
                .with_provenance(sequence, reference);

            match &record.error {
                None => tracing::info!(
                    "[{}/{}] {} collected ({} substances)",
                    sequence,
                    total,
                    record.display_name(),
                    record.substances.len()
                ),
                Some(e) => tracing::warn!("[{}/{}] {}", sequence, total, e),
            }
            records.push(record);

            if sequence < total {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => {}
                    () = self.sleeper.sleep(inter_request_delay) => {}
                }
            }
        }

        // Cancellation may land during the last facility, after the loop check
        metadata.cancelled = self.cancel.is_cancelled();
        metadata.finished_at = Utc::now();
        let result = CrawlResult::new(metadata, records);
        tracing::info!(
            "Harvest finished: {} facilities, {} succeeded, {} failed",
            result.metadata.obtained,
            result.metadata.succeeded,
            result.metadata.failed
        );

        Ok(result)
    }
}
