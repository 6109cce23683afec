//! cdr-harvest: chemical release registry harvester
//!
//! This crate discovers every facility that reported a chemical substance for
//! a given year in a paginated public registry, fetches each facility's detail
//! record, and normalizes the results into a single serializable dataset.

pub mod client;
pub mod config;
pub mod extract;
pub mod harvest;
pub mod model;
pub mod output;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error for facility {facility_id}: {message}")]
    Parse {
        facility_id: String,
        message: String,
    },

    #[error("Gave up on facility {facility_id} after {attempts} attempts: {last}")]
    RetryExhausted {
        facility_id: String,
        attempts: u32,
        last: Box<HarvestError>,
    },

    #[error("Could not reach upstream: {source}")]
    Unreachable { source: Box<HarvestError> },

    #[error("Cancelled facility {facility_id} after {attempts} attempts; last error: {last}")]
    Cancelled {
        facility_id: String,
        attempts: u32,
        last: Box<HarvestError>,
    },
}

impl HarvestError {
    /// Returns true for failures of the transport layer (network or HTTP status)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Harvester, RetryPolicy};
pub use model::{CrawlResult, FacilityRecord, FacilityReference, SubstanceEntry};
