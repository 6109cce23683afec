//! JSON file sink

use crate::model::CrawlResult;
use crate::output::traits::{OutputError, OutputResult, OutputSink};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the result as one pretty-printed JSON document
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    directory: PathBuf,
    file: Option<PathBuf>,
}

impl JsonFileSink {
    /// Sink writing `{query}_{year}_facilities.json` under `directory`
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            file: None,
        }
    }

    /// Sink writing to an explicit file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            directory: PathBuf::new(),
            file: Some(path.into()),
        }
    }

    /// Resolves the file the result will be written to
    pub fn target(&self, result: &CrawlResult) -> PathBuf {
        match &self.file {
            Some(path) => path.clone(),
            None => self.directory.join(default_file_name(
                &result.metadata.substance_query,
                &result.metadata.year,
            )),
        }
    }
}

impl OutputSink for JsonFileSink {
    fn write(&self, result: &CrawlResult) -> OutputResult<PathBuf> {
        let path = self.target(result);
        let body = serde_json::to_string_pretty(result)?;

        write_file(&path, &body)?;
        tracing::info!(
            "Wrote {} facility records to {}",
            result.records.len(),
            path.display()
        );
        Ok(path)
    }
}

fn write_file(path: &Path, body: &str) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds the default output file name for a query and year
///
/// Characters that are unsafe in file names are replaced with `_`.
pub fn default_file_name(query: &str, year: &str) -> String {
    format!("{}_{}_facilities.json", sanitize(query), sanitize(year))
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "query".to_string()
    } else {
        cleaned
    }
}
