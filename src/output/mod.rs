//! Output module for persisting harvest results and reporting on them
//!
//! This module handles:
//! - Writing the consolidated dataset as a JSON document
//! - Computing and printing the closing run summary

mod json;
pub mod stats;
mod traits;

pub use json::{default_file_name, JsonFileSink};
pub use stats::{print_summary, RunSummary};
pub use traits::{OutputError, OutputResult, OutputSink};
