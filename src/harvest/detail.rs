//! Per-facility detail retrieval with bounded retry
//!
//! Each facility goes through a small state machine:
//!
//! ```text
//! Attempting(1) --ok--> Done
//!      |
//!     err (n < max, not cancelled) --sleep--> Attempting(n + 1)
//!      |
//!     err (n == max) --> Failed
//!      |
//!     err, cancelled before the next attempt --> Cancelled
//! ```
//!
//! `Failed` still yields a [`FacilityRecord`], with `error` set, so a failed
//! facility is visible in the dataset instead of silently missing.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{ChemicalConfig, DetailConfig};
use crate::extract::{parse_table, DetailParser};
use crate::harvest::traits::{ChemicalFetcher, DetailFetcher, Sleeper};
use crate::model::{FacilityRecord, SubstanceEntry};
use crate::{HarvestError, Result};

/// How many times a facility is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(config: &DetailConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Paging parameters of the chemical sub-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChemicalPaging {
    pub page_unit: u32,
    pub max_pages: u32,
}

impl ChemicalPaging {
    pub fn from_config(config: &ChemicalConfig) -> Self {
        Self {
            page_unit: config.page_unit.max(1),
            max_pages: config.max_pages.max(1),
        }
    }
}

impl Default for ChemicalPaging {
    fn default() -> Self {
        Self {
            page_unit: 10,
            max_pages: 100,
        }
    }
}

enum AttemptState {
    Attempting(u32),
    Done(FacilityRecord),
    Failed { attempts: u32, last: HarvestError },
    Cancelled { attempts: u32, last: HarvestError },
}

/// Identity fields and substances gathered by one successful attempt
type AttemptOutput = (BTreeMap<String, String>, Vec<SubstanceEntry>);

/// Retrieves facility records through a shared connection context
pub struct DetailRetriever<'a, F, S> {
    fetcher: &'a F,
    sleeper: &'a S,
    parser: &'a DetailParser,
    policy: RetryPolicy,
    paging: ChemicalPaging,
    cancel: Option<&'a CancellationToken>,
}

impl<'a, F, S> DetailRetriever<'a, F, S>
where
    F: DetailFetcher + ChemicalFetcher,
    S: Sleeper,
{
    pub fn new(
        fetcher: &'a F,
        sleeper: &'a S,
        parser: &'a DetailParser,
        policy: RetryPolicy,
        paging: ChemicalPaging,
    ) -> Self {
        Self {
            fetcher,
            sleeper,
            parser,
            policy,
            paging,
            cancel: None,
        }
    }

    /// Stops retrying once `token` is cancelled
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|t| t.is_cancelled())
    }

    /// Fetches one facility's record, retrying failed attempts
    ///
    /// Never fails: when every attempt fails the returned record carries the
    /// last error and no identity fields or substances.
    pub async fn fetch_detail(&self, facility_id: &str, year: &str) -> FacilityRecord {
        let mut state = AttemptState::Attempting(1);

        loop {
            state = match state {
                AttemptState::Attempting(n) => match self.attempt(facility_id, year).await {
                    Ok((identity_fields, substances)) => AttemptState::Done(
                        FacilityRecord::success(facility_id, identity_fields, substances, n),
                    ),
                    Err(e) => {
                        tracing::warn!(
                            "Attempt {}/{} for facility {} failed: {}",
                            n,
                            self.policy.max_attempts,
                            facility_id,
                            e
                        );
                        if n >= self.policy.max_attempts {
                            AttemptState::Failed { attempts: n, last: e }
                        } else if self.wait_before_retry().await {
                            AttemptState::Attempting(n + 1)
                        } else {
                            tracing::info!("Cancelled while retrying facility {}", facility_id);
                            AttemptState::Cancelled { attempts: n, last: e }
                        }
                    }
                },
                AttemptState::Done(record) => return record,
                AttemptState::Failed { attempts, last } => {
                    let error = HarvestError::RetryExhausted {
                        facility_id: facility_id.to_string(),
                        attempts,
                        last: Box::new(last),
                    };
                    return FacilityRecord::failure(facility_id, error.to_string(), attempts);
                }
                AttemptState::Cancelled { attempts, last } => {
                    let error = HarvestError::Cancelled {
                        facility_id: facility_id.to_string(),
                        attempts,
                        last: Box::new(last),
                    };
                    return FacilityRecord::failure(facility_id, error.to_string(), attempts);
                }
            };
        }
    }

    /// Sleeps for the retry delay; returns false if cancelled first
    async fn wait_before_retry(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        match self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {}
                    () = self.sleeper.sleep(self.policy.retry_delay) => {}
                }
                !token.is_cancelled()
            }
            None => {
                self.sleeper.sleep(self.policy.retry_delay).await;
                true
            }
        }
    }

    async fn attempt(&self, facility_id: &str, year: &str) -> Result<AttemptOutput> {
        let html = self.fetcher.fetch_detail(facility_id, year).await?;
        let page = self
            .parser
            .parse(&html)
            .map_err(|message| HarvestError::Parse {
                facility_id: facility_id.to_string(),
                message,
            })?;

        let mut substances = self.fetch_substances(facility_id, year).await?;
        if substances.is_empty() && !page.embedded_substances.is_empty() {
            tracing::debug!(
                "Using {} substances embedded in detail page of {}",
                page.embedded_substances.len(),
                facility_id
            );
            substances = page.embedded_substances;
        }

        Ok((page.identity_fields, substances))
    }

    /// Reads the chemical sub-list page by page
    ///
    /// Stops on an empty page, once `ceil(total / page_unit)` pages are read
    /// (total declared on the first page), or at the page ceiling.
    async fn fetch_substances(&self, facility_id: &str, year: &str) -> Result<Vec<SubstanceEntry>> {
        let unit = self.paging.page_unit;
        let mut entries = Vec::new();
        let mut declared_pages: Option<u64> = None;
        let mut page_index = 1;

        loop {
            if page_index > self.paging.max_pages {
                tracing::warn!(
                    "Chemical page ceiling {} reached for facility {}",
                    self.paging.max_pages,
                    facility_id
                );
                break;
            }

            let page = self
                .fetcher
                .fetch_chemical_page(facility_id, year, page_index, unit)
                .await?;
            if page.is_empty() {
                break;
            }

            if page_index == 1 {
                declared_pages = page.total_count.map(|total| total.div_ceil(u64::from(unit)));
            }
            entries.extend(parse_table(&page.table));

            if declared_pages.is_some_and(|pages| u64::from(page_index) >= pages) {
                break;
            }
            page_index += 1;
        }

        Ok(entries)
    }
}
