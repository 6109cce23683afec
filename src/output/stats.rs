//! Closing summary of a harvest run
//!
//! This module computes the report printed once the dataset has been
//! written: overall counts, substance coverage and a preview of the
//! facilities collected.

use crate::model::CrawlResult;

/// Number of facility names shown in the preview
pub const PREVIEW_LEN: usize = 3;

/// Run summary derived from a [`CrawlResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub substance_query: String,
    pub year: String,

    /// Facilities discovered by pagination
    pub discovered: usize,

    /// Records produced
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Successful facilities with at least one substance entry
    pub facilities_with_substances: usize,

    /// Substance entries across all successful facilities
    pub total_substances: usize,

    /// Display names of the first successful facilities
    pub preview: Vec<String>,

    /// Failed facility ids with their last error
    pub failures: Vec<(String, String)>,

    pub cancelled: bool,
    pub listing_interrupted: Option<String>,
    pub duration_seconds: i64,
}

impl RunSummary {
    pub fn from_result(result: &CrawlResult) -> Self {
        let metadata = &result.metadata;

        let facilities_with_substances = result
            .successes()
            .filter(|r| !r.substances.is_empty())
            .count();
        let total_substances = result.successes().map(|r| r.substances.len()).sum();
        let preview = result
            .successes()
            .take(PREVIEW_LEN)
            .map(|r| r.display_name().to_string())
            .collect();
        let failures = result
            .failures()
            .map(|r| (r.facility_id.clone(), r.error.clone().unwrap_or_default()))
            .collect();

        Self {
            substance_query: metadata.substance_query.clone(),
            year: metadata.year.clone(),
            discovered: metadata.discovered,
            total: metadata.obtained,
            succeeded: metadata.succeeded,
            failed: metadata.failed,
            facilities_with_substances,
            total_substances,
            preview,
            failures,
            cancelled: metadata.cancelled,
            listing_interrupted: metadata.listing_interrupted.clone(),
            duration_seconds: (metadata.finished_at - metadata.started_at).num_seconds(),
        }
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total as f64) * 100.0
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Query: {} ({})", summary.substance_query, summary.year);
    println!("  Facilities discovered: {}", summary.discovered);
    println!("  Records collected: {}", summary.total);
    println!(
        "  Succeeded: {} ({:.1}%)",
        summary.succeeded,
        summary.success_rate()
    );
    println!("  Failed: {}", summary.failed);
    println!("  Duration: {}s", summary.duration_seconds);
    println!();

    println!("Substances:");
    println!(
        "  Facilities with substance entries: {}",
        summary.facilities_with_substances
    );
    println!("  Total substance entries: {}", summary.total_substances);
    println!();

    if !summary.preview.is_empty() {
        println!("First facilities:");
        for (i, name) in summary.preview.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        println!();
    }

    if !summary.failures.is_empty() {
        println!("Failures ({}):", summary.failures.len());
        for (id, error) in &summary.failures {
            println!("  - {}: {}", id, error);
        }
        println!();
    }

    if let Some(reason) = &summary.listing_interrupted {
        println!("Listing stopped early: {}", reason);
    }
    if summary.cancelled {
        println!("Run was cancelled; the dataset is partial.");
    }
}
