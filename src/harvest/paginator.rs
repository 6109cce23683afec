//! Cursor-based pagination over the facility listing

use std::collections::HashSet;

use crate::harvest::traits::ListingFetcher;
use crate::model::FacilityReference;
use crate::{HarvestError, Result};

/// Outcome of paginating the facility listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Distinct facilities, in discovery order, at most `max_items`
    pub items: Vec<FacilityReference>,

    /// Number of pages actually fetched
    pub pages_fetched: u32,

    /// Why pagination stopped before the listing was exhausted, if it did
    pub interrupted: Option<String>,
}

/// Walks listing pages until the listing is exhausted or enough items are collected
///
/// # Termination
///
/// | Condition | Result |
/// |-----------|--------|
/// | Page returns no items | Done |
/// | Collected ≥ `max_items` | Done, truncated to `max_items` |
/// | `max_stalled_pages` pages in a row add no new facility | Stopped, `interrupted` set |
/// | Page number exceeds `max_pages` | Stopped, `interrupted` set |
/// | Fetch error on page 1 | `Err(HarvestError::Unreachable)` |
/// | Fetch error on a later page | Stopped, `interrupted` set |
pub struct Paginator<'a, L> {
    fetcher: &'a L,
    max_stalled_pages: u32,
    max_pages: u32,
}

impl<'a, L: ListingFetcher> Paginator<'a, L> {
    pub fn new(fetcher: &'a L) -> Self {
        Self {
            fetcher,
            max_stalled_pages: 3,
            max_pages: 1000,
        }
    }

    /// Sets the stall guard and the page ceiling (both at least 1)
    pub fn with_limits(mut self, max_stalled_pages: u32, max_pages: u32) -> Self {
        self.max_stalled_pages = max_stalled_pages.max(1);
        self.max_pages = max_pages.max(1);
        self
    }

    /// Collects up to `max_items` facilities for a substance query
    ///
    /// Facilities already seen on an earlier page, or without an id, are
    /// not collected again. With `max_items == 0` no request is made.
    pub async fn fetch_all(
        &self,
        query: &str,
        year: &str,
        page_size: u32,
        max_items: usize,
    ) -> Result<Listing> {
        let mut listing = Listing::default();
        if max_items == 0 {
            return Ok(listing);
        }

        let mut seen = HashSet::new();
        let mut stalled = 0;
        let mut page = 1;

        loop {
            if page > self.max_pages {
                tracing::warn!("Listing page ceiling {} reached, stopping", self.max_pages);
                listing.interrupted = Some(format!("page ceiling {} reached", self.max_pages));
                break;
            }

            let batch = match self.fetcher.fetch_page(query, year, page, page_size).await {
                Ok(batch) => batch,
                Err(e) if page == 1 => {
                    return Err(HarvestError::Unreachable {
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Listing page {} failed, keeping {} facilities: {}",
                        page,
                        listing.items.len(),
                        e
                    );
                    listing.interrupted = Some(format!("page {} failed: {}", page, e));
                    break;
                }
            };
            listing.pages_fetched += 1;

            if batch.is_empty() {
                tracing::debug!("Listing page {} is empty, pagination complete", page);
                break;
            }

            let before = listing.items.len();
            for reference in batch {
                if reference.facility_id.is_empty() {
                    continue;
                }
                if seen.insert(reference.facility_id.clone()) {
                    listing.items.push(reference);
                }
            }
            let added = listing.items.len() - before;
            tracing::debug!("Listing page {}: {} new facilities", page, added);

            if added == 0 {
                stalled += 1;
                if stalled >= self.max_stalled_pages {
                    tracing::warn!(
                        "{} consecutive listing pages added nothing new, stopping at page {}",
                        stalled,
                        page
                    );
                    listing.interrupted =
                        Some(format!("no new facilities on {} consecutive pages", stalled));
                    break;
                }
            } else {
                stalled = 0;
            }

            if listing.items.len() >= max_items {
                break;
            }
            page += 1;
        }

        listing.items.truncate(max_items);
        Ok(listing)
    }
}
