// tunebank-cli/src/stats.rs
// ============================================================================
// Module: Tunebank Table Stats
// Description: Read-only row counts over the two tuning-database tables.
// Purpose: Quick inspection of a work directory without loading programs.
// Dependencies: rusqlite, thiserror, tunebank-core
// ============================================================================

//! ## Overview
//! Counts rows in the workload and tuning record tables of a work directory
//! and classifies each record as valid or invalid for ranking using the same
//! policy the store applies to top-k queries. Programs are never decoded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params;
use thiserror::Error;
use tunebank_core::core::policy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Workload table file name inside the work directory.
const WORKLOAD_SQLITE: &str = "database_workload.sqlite";
/// Tuning record table file name inside the work directory.
const TUNING_RECORD_SQLITE: &str = "database_tuning_record.sqlite";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Stats failures.
#[derive(Debug, Error)]
pub enum StatsError {
    /// Table file is missing.
    #[error("stats missing table file: {0}")]
    Missing(PathBuf),
    /// `SQLite` engine error.
    #[error("stats db error: {0}")]
    Db(String),
    /// A run_secs column failed to parse.
    #[error("stats corrupt row: {0}")]
    Corrupt(String),
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Row counts for one work directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSummary {
    /// Distinct workloads committed.
    pub workloads: usize,
    /// Total tuning records, valid or not.
    pub tuning_records: usize,
    /// Records usable for ranking.
    pub valid_records: usize,
}

// ============================================================================
// SECTION: Stats
// ============================================================================

/// Gathers row counts for the tables under `work_dir`.
///
/// # Errors
///
/// Returns [`StatsError`] when a table file is missing or unreadable.
pub fn stats_for_work_dir(work_dir: &Path) -> Result<StatsSummary, StatsError> {
    let path_workload = work_dir.join(WORKLOAD_SQLITE);
    let path_tuning_record = work_dir.join(TUNING_RECORD_SQLITE);
    let workloads = count_rows(&path_workload, "SELECT COUNT(*) FROM workload")?;
    let tuning_records =
        count_rows(&path_tuning_record, "SELECT COUNT(*) FROM tuning_record")?;
    let valid_records = count_valid_records(&path_tuning_record)?;
    Ok(StatsSummary {
        workloads,
        tuning_records,
        valid_records,
    })
}

/// Opens a table file read-only.
fn open_read_only(path: &Path) -> Result<Connection, StatsError> {
    if !path.is_file() {
        return Err(StatsError::Missing(path.to_path_buf()));
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|err| StatsError::Db(err.to_string()))
}

/// Runs a COUNT query against one table file.
fn count_rows(path: &Path, statement: &str) -> Result<usize, StatsError> {
    let connection = open_read_only(path)?;
    let count: i64 = connection
        .query_row(statement, params![], |row| row.get(0))
        .map_err(|err| StatsError::Db(err.to_string()))?;
    usize::try_from(count).map_err(|_| StatsError::Db(format!("negative row count {count}")))
}

/// Counts records whose run_secs column makes them rankable.
fn count_valid_records(path: &Path) -> Result<usize, StatsError> {
    let connection = open_read_only(path)?;
    let mut prepared = connection
        .prepare("SELECT run_secs FROM tuning_record")
        .map_err(|err| StatsError::Db(err.to_string()))?;
    let columns = prepared
        .query_map(params![], |row| row.get::<_, String>(0))
        .map_err(|err| StatsError::Db(err.to_string()))?
        .collect::<Result<Vec<String>, _>>()
        .map_err(|err| StatsError::Db(err.to_string()))?;
    let mut valid = 0_usize;
    for column in columns {
        let run_secs: Option<Vec<f64>> = serde_json::from_str(&column)
            .map_err(|err| StatsError::Corrupt(format!("run_secs column is malformed: {err}")))?;
        if policy::is_valid(run_secs.as_deref()) {
            valid += 1;
        }
    }
    Ok(valid)
}
