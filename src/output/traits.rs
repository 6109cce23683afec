//! Output sink trait and errors
//!
//! A sink receives the consolidated result of a run once, after the last
//! facility has been processed (or the run was cancelled).

use crate::model::CrawlResult;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for result sinks
pub trait OutputSink {
    /// Persists the result, returning where it was written
    fn write(&self, result: &CrawlResult) -> OutputResult<PathBuf>;

    /// Persists the result unless it holds no records
    fn write_non_empty(&self, result: &CrawlResult) -> OutputResult<Option<PathBuf>> {
        if result.is_empty() {
            tracing::info!("No facility records collected, nothing written");
            return Ok(None);
        }
        self.write(result).map(Some)
    }
}
