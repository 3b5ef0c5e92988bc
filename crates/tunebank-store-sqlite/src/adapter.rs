// tunebank-store-sqlite/src/adapter.rs
// ============================================================================
// Module: SQLite Backing Store Adapter
// Description: Connection-per-operation statement execution over SQLite.
// Purpose: Execute parameterized statements against the two durable tables.
// Dependencies: rusqlite, thiserror, tunebank-core
// ============================================================================

//! ## Overview
//! The adapter owns no state between calls: every operation opens a
//! connection, applies the durability pragmas, performs one statement, and
//! closes. Single-statement autocommit means there is never a dangling
//! transaction to recover, at the cost of per-call connection setup.
//!
//! All textual payloads are bound as statement parameters, never
//! interpolated; serialized programs and trace JSON routinely contain quote
//! characters that would corrupt string-built statements.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::Row;
use rusqlite::ToSql;
use serde::Deserialize;
use thiserror::Error;
use tunebank_core::DatabaseError;

// ============================================================================
// SECTION: Connection Modes
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Per-connection settings applied on every open.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Journal mode pragma.
    pub journal_mode: SqliteJournalMode,
    /// Sync mode pragma.
    pub sync_mode: SqliteSyncMode,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Adapter-level failures surfaced by statement execution.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// `SQLite` engine error.
    #[error("sqlite adapter db error: {0}")]
    Db(String),
    /// Filesystem error while reaching the database file.
    #[error("sqlite adapter io error: {0}")]
    Io(String),
}

impl From<AdapterError> for DatabaseError {
    fn from(error: AdapterError) -> Self {
        match error {
            AdapterError::Db(message) => Self::Db(message),
            AdapterError::Io(message) => Self::Io(message),
        }
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Creates a table with the given column schema.
///
/// # Errors
///
/// Returns [`AdapterError`] when the connection or statement fails.
pub fn create_table(
    path: &Path,
    settings: &ConnectionSettings,
    table: &str,
    schema: &str,
) -> Result<(), AdapterError> {
    let connection = open_connection(path, settings)?;
    connection
        .execute_batch(&format!("CREATE TABLE {table}({schema})"))
        .map_err(|err| AdapterError::Db(err.to_string()))
}

/// Executes one parameterized write statement.
///
/// # Errors
///
/// Returns [`AdapterError`] when the connection or statement fails.
pub fn execute(
    path: &Path,
    settings: &ConnectionSettings,
    statement: &str,
    params: &[&dyn ToSql],
) -> Result<usize, AdapterError> {
    let connection = open_connection(path, settings)?;
    connection
        .execute(statement, params)
        .map_err(|err| AdapterError::Db(err.to_string()))
}

/// Runs one parameterized query and maps every row in result order.
///
/// # Errors
///
/// Returns [`AdapterError`] when the connection, statement, or row mapping
/// fails.
pub fn fetch_all<T>(
    path: &Path,
    settings: &ConnectionSettings,
    statement: &str,
    params: &[&dyn ToSql],
    map_row: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, AdapterError> {
    let connection = open_connection(path, settings)?;
    let mut prepared = connection
        .prepare(statement)
        .map_err(|err| AdapterError::Db(err.to_string()))?;
    let rows = prepared
        .query_map(params, map_row)
        .map_err(|err| AdapterError::Db(err.to_string()))?;
    rows.collect::<Result<Vec<T>, _>>().map_err(|err| AdapterError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Opens a connection and applies the durability pragmas.
fn open_connection(path: &Path, settings: &ConnectionSettings) -> Result<Connection, AdapterError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(path, flags)
        .map_err(|err| AdapterError::Io(format!("{}: {err}", path.display())))?;
    apply_pragmas(&connection, settings)?;
    Ok(connection)
}

/// Applies journal, sync, and busy-timeout pragmas.
fn apply_pragmas(
    connection: &Connection,
    settings: &ConnectionSettings,
) -> Result<(), AdapterError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", settings.journal_mode.pragma_value()))
        .map_err(|err| AdapterError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", settings.sync_mode.pragma_value()))
        .map_err(|err| AdapterError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(settings.busy_timeout_ms))
        .map_err(|err| AdapterError::Db(err.to_string()))?;
    Ok(())
}
