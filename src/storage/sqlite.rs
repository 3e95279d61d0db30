//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ReportStore trait.

use crate::analysis::{AnalysisReport, CategoryScore};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ReportStore, StorageError, StorageResult};
use crate::storage::{ArchiveStatistics, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const REPORT_COLUMNS: &str = "company_name, url, summary,
    environmental_score, environmental_assessment, environmental_gaps,
    social_score, social_assessment, social_gaps,
    governance_score, governance_assessment, governance_gaps,
    timestamp";

/// SQLite report archive
pub struct SqliteReportStore {
    conn: Connection,
}

impl SqliteReportStore {
    /// Opens or creates an archive
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteReportStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn run_exists(&self, run_id: i64) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM runs WHERE id = ?1", params![run_id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        seed_url: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Running),
    })
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<AnalysisReport> {
    let category = |offset: usize| -> rusqlite::Result<CategoryScore> {
        Ok(CategoryScore {
            score: row.get(offset)?,
            assessment: row.get(offset + 1)?,
            gaps: row.get(offset + 2)?,
        })
    };

    Ok(AnalysisReport {
        company_name: row.get(0)?,
        url: row.get(1)?,
        summary: row.get(2)?,
        environmental: category(3)?,
        social: category(6)?,
        governance: category(9)?,
        timestamp: row.get(12)?,
    })
}

impl ReportStore for SqliteReportStore {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, seed_url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, seed_url, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, seed_url, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed_url, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed_url, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Reports =====

    fn save_report(&mut self, run_id: i64, report: &AnalysisReport) -> StorageResult<i64> {
        if !self.run_exists(run_id)? {
            return Err(StorageError::RunNotFound(run_id));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            &format!(
                "INSERT INTO reports (run_id, {}, archived_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                REPORT_COLUMNS
            ),
            params![
                run_id,
                report.company_name,
                report.url,
                report.summary,
                report.environmental.score,
                report.environmental.assessment,
                report.environmental.gaps,
                report.social.score,
                report.social.assessment,
                report.social.gaps,
                report.governance.score,
                report.governance.assessment,
                report.governance.gaps,
                report.timestamp,
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn load_reports_newest_first(&self) -> StorageResult<Vec<AnalysisReport>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM reports ORDER BY id DESC",
            REPORT_COLUMNS
        ))?;

        let reports = stmt
            .query_map([], report_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    // ===== Statistics =====

    fn statistics(&self) -> StorageResult<ArchiveStatistics> {
        let (total_runs, completed_runs): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(CASE WHEN status = ?1 THEN 1 END) FROM runs",
            params![RunStatus::Completed.to_db_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (total_reports, distinct_urls, avg_env, avg_social, avg_gov) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT url),
                    AVG(environmental_score), AVG(social_score), AVG(governance_score)
             FROM reports",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                ))
            },
        )?;

        Ok(ArchiveStatistics {
            total_runs: total_runs as u64,
            completed_runs: completed_runs as u64,
            total_reports: total_reports as u64,
            distinct_urls: distinct_urls as u64,
            average_environmental: avg_env,
            average_social: avg_social,
            average_governance: avg_gov,
            latest_run: self.latest_run()?,
        })
    }
}
