//! Harvest module - discovery, retrieval and orchestration
//!
//! This module contains the core harvesting logic, including:
//! - Collaborator traits for the listing, detail and chemical endpoints
//! - Cursor-based pagination of the facility listing
//! - Per-facility detail retrieval with bounded retry
//! - Sequential, rate-limited orchestration of a whole run

mod detail;
mod orchestrator;
mod paginator;
mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use detail::{ChemicalPaging, DetailRetriever, RetryPolicy};
pub use orchestrator::{HarvestSettings, Harvester};
pub use paginator::{Listing, Paginator};
pub use traits::{
    ChemicalFetcher, ChemicalPage, DetailFetcher, ListingFetcher, Sleeper, TokioSleeper,
};
