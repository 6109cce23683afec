//! Configuration module for cdr-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an empty file (or no file) yields settings for
//! the public registry.
//!
//! # Example
//!
//! ```no_run
//! use cdr_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Detail attempts: {}", config.detail.max_attempts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ChemicalConfig, Config, DetailConfig, HarvestConfig, ListingConfig, OutputConfig,
    UpstreamConfig, FACILITY_NAME_LABEL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_year;
