//! Output module for exporting reports and printing run results
//!
//! This module handles:
//! - Writing the JSON array of reports
//! - Generating the Markdown master document
//! - Printing run summaries and archive statistics

mod json;
mod markdown;
pub mod stats;

pub use json::write_json_reports;
pub use markdown::{format_report_document, write_report_document, DOCUMENT_TITLE};
pub use stats::{format_results_table, print_archive_statistics, print_run_summary};

use crate::storage::{ReportStore, StorageError};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Regenerates the master document from every archived report
///
/// # Arguments
///
/// * `store` - The report archive
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(usize)` - Number of reports written
/// * `Err(OutputError)` - Failed to load reports or write the document
pub fn export_document_from_archive(
    store: &dyn ReportStore,
    output_path: &Path,
) -> OutputResult<usize> {
    let reports = store.load_reports_newest_first()?;
    write_report_document(&reports, output_path)?;
    tracing::info!(
        "Wrote {} report(s) to {}",
        reports.len(),
        output_path.display()
    );
    Ok(reports.len())
}
