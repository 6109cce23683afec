//! Data model for harvested facilities
//!
//! References come from the listing endpoint, records are produced by the
//! detail retriever, and a [`CrawlResult`] collects them for persistence.

mod facility;
mod result;

pub use facility::{FacilityRecord, FacilityReference, SubstanceEntry};
pub use result::{CrawlResult, RunMetadata};
