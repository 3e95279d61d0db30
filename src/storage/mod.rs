//! Storage module for the report archive
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run tracking with the configuration hash of each run
//! - Accumulating analysis reports across runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteReportStore;
pub use traits::{ReportStore, StorageError, StorageResult};

use std::path::Path;

/// Opens or creates the report archive at `path`
pub fn open_archive(path: &Path) -> StorageResult<SqliteReportStore> {
    SqliteReportStore::new(path)
}

/// Represents a pipeline run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub seed_url: String,
    pub status: RunStatus,
}

/// Aggregate figures over the whole archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveStatistics {
    pub total_runs: u64,
    pub completed_runs: u64,
    pub total_reports: u64,
    pub distinct_urls: u64,

    /// Average pillar scores; `None` while the archive holds no reports
    pub average_environmental: Option<f64>,
    pub average_social: Option<f64>,
    pub average_governance: Option<f64>,

    pub latest_run: Option<RunRecord>,
}

/// Status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    /// The crawl hit its session timeout
    TimedOut,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "timed_out" => Some(Self::TimedOut),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
