//! Storage traits and error types
//!
//! This module defines the trait interface for report archive backends and
//! associated error types.

use crate::analysis::AnalysisReport;
use crate::storage::{ArchiveStatistics, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for report archive implementations
///
/// Reports accumulate across runs; each run records the configuration hash
/// and seed it was started with.
pub trait ReportStore {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `seed_url` - URL the crawl started from
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, seed_url: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and stamps its finish time
    fn complete_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Reports =====

    /// Archives one report under a run, returning its row ID
    fn save_report(&mut self, run_id: i64, report: &AnalysisReport) -> StorageResult<i64>;

    /// Loads every archived report, most recently archived first
    fn load_reports_newest_first(&self) -> StorageResult<Vec<AnalysisReport>>;

    // ===== Statistics =====

    /// Aggregates run and report counts plus average pillar scores
    fn statistics(&self) -> StorageResult<ArchiveStatistics>;
}
