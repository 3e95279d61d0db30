//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the report archive.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track pipeline runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    seed_url TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per analyzed page
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    company_name TEXT NOT NULL,
    summary TEXT NOT NULL,
    environmental_score INTEGER NOT NULL,
    environmental_assessment TEXT NOT NULL,
    environmental_gaps TEXT,
    social_score INTEGER NOT NULL,
    social_assessment TEXT NOT NULL,
    social_gaps TEXT,
    governance_score INTEGER NOT NULL,
    governance_assessment TEXT NOT NULL,
    governance_gaps TEXT,
    timestamp TEXT NOT NULL,
    archived_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_run ON reports(run_id);
CREATE INDEX IF NOT EXISTS idx_reports_url ON reports(url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
