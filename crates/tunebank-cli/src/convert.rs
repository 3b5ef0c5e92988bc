// tunebank-cli/src/convert.rs
// ============================================================================
// Module: Tunebank Dump Conversion
// Description: Bulk-convert newline-delimited JSON dumps into SQLite tables.
// Purpose: Offline migration of tuning-database dumps with identical row semantics.
// Dependencies: rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Converts a work directory's `database_workload.json` and
//! `database_tuning_record.json` dumps (one JSON array per line) into the two
//! `SQLite` table files the store reads. Each workload line is
//! `[shash, mod]`; each tuning record line is
//! `[workload_index, [trace, run_secs, target, args_info]]`. Pre-existing
//! output files are removed first; rows are inserted parameter-bound inside
//! one transaction per table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::params;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Workload dump file name inside the work directory.
const WORKLOAD_JSON: &str = "database_workload.json";
/// Tuning record dump file name inside the work directory.
const TUNING_RECORD_JSON: &str = "database_tuning_record.json";
/// Workload table output file name.
const WORKLOAD_SQLITE: &str = "database_workload.sqlite";
/// Tuning record table output file name.
const TUNING_RECORD_SQLITE: &str = "database_tuning_record.sqlite";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Conversion failures.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Dump file could not be read.
    #[error("convert io error: {0}")]
    Io(String),
    /// A dump line did not match the expected layout.
    #[error("convert parse error at {path}:{line}: {message}")]
    Parse {
        /// Dump file the malformed line came from.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Description of the mismatch.
        message: String,
    },
    /// `SQLite` engine error.
    #[error("convert db error: {0}")]
    Db(String),
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Outcome of a completed conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Number of workload rows written.
    pub workloads: usize,
    /// Number of tuning record rows written.
    pub tuning_records: usize,
    /// Path of the workload table file.
    pub path_workload: PathBuf,
    /// Path of the tuning record table file.
    pub path_tuning_record: PathBuf,
}

// ============================================================================
// SECTION: Conversion
// ============================================================================

/// Converts the JSON dumps in `work_dir` into the two `SQLite` table files.
///
/// # Errors
///
/// Returns [`ConvertError`] when a dump is unreadable, a line is malformed,
/// or a statement fails. Pre-existing outputs are removed before conversion
/// starts, so a failed run leaves no stale tables behind.
pub fn convert_work_dir(work_dir: &Path) -> Result<ConvertSummary, ConvertError> {
    let path_workload = work_dir.join(WORKLOAD_SQLITE);
    let path_tuning_record = work_dir.join(TUNING_RECORD_SQLITE);
    recreate_table(&path_workload, "workload", "shash text, mod text")?;
    recreate_table(
        &path_tuning_record,
        "tuning_record",
        "workload_index int, trace text, run_secs text, target text, args_info text",
    )?;
    let workloads = convert_workloads(&work_dir.join(WORKLOAD_JSON), &path_workload)?;
    let tuning_records =
        convert_tuning_records(&work_dir.join(TUNING_RECORD_JSON), &path_tuning_record)?;
    Ok(ConvertSummary {
        workloads,
        tuning_records,
        path_workload,
        path_tuning_record,
    })
}

/// Removes any stale output file and creates a fresh table.
fn recreate_table(path: &Path, table: &str, schema: &str) -> Result<(), ConvertError> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|err| ConvertError::Io(err.to_string()))?;
    }
    let connection = Connection::open(path).map_err(|err| ConvertError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("CREATE TABLE {table}({schema})"))
        .map_err(|err| ConvertError::Db(err.to_string()))
}

/// Streams workload dump lines into the workload table.
fn convert_workloads(dump: &Path, output: &Path) -> Result<usize, ConvertError> {
    let mut connection =
        Connection::open(output).map_err(|err| ConvertError::Db(err.to_string()))?;
    let tx = connection.transaction().map_err(|err| ConvertError::Db(err.to_string()))?;
    let mut written = 0_usize;
    for (number, line) in dump_lines(dump)? {
        let row = parse_line(dump, number, &line)?;
        let [shash, module] = two_elements(dump, number, &row)?;
        let shash = shash_text(dump, number, shash)?;
        let module = module.as_str().ok_or_else(|| ConvertError::Parse {
            path: dump.to_path_buf(),
            line: number,
            message: "mod element is not a string".to_string(),
        })?;
        tx.execute("INSERT INTO workload VALUES (?1, ?2)", params![shash, module])
            .map_err(|err| ConvertError::Db(err.to_string()))?;
        written += 1;
    }
    tx.commit().map_err(|err| ConvertError::Db(err.to_string()))?;
    Ok(written)
}

/// Streams tuning record dump lines into the tuning record table.
fn convert_tuning_records(dump: &Path, output: &Path) -> Result<usize, ConvertError> {
    let mut connection =
        Connection::open(output).map_err(|err| ConvertError::Db(err.to_string()))?;
    let tx = connection.transaction().map_err(|err| ConvertError::Db(err.to_string()))?;
    let mut written = 0_usize;
    for (number, line) in dump_lines(dump)? {
        let row = parse_line(dump, number, &line)?;
        let [index, fields] = two_elements(dump, number, &row)?;
        let workload_index = index.as_i64().ok_or_else(|| ConvertError::Parse {
            path: dump.to_path_buf(),
            line: number,
            message: "workload_index element is not an integer".to_string(),
        })?;
        let fields = fields.as_array().filter(|fields| fields.len() == 4).ok_or_else(|| {
            ConvertError::Parse {
                path: dump.to_path_buf(),
                line: number,
                message: "record element is not a 4-element array".to_string(),
            }
        })?;
        let columns = fields
            .iter()
            .map(|field| {
                serde_json::to_string(field).map_err(|err| ConvertError::Parse {
                    path: dump.to_path_buf(),
                    line: number,
                    message: format!("record field cannot be re-serialized: {err}"),
                })
            })
            .collect::<Result<Vec<String>, ConvertError>>()?;
        tx.execute(
            "INSERT INTO tuning_record VALUES (?1, ?2, ?3, ?4, ?5)",
            params![workload_index, columns[0], columns[1], columns[2], columns[3]],
        )
        .map_err(|err| ConvertError::Db(err.to_string()))?;
        written += 1;
    }
    tx.commit().map_err(|err| ConvertError::Db(err.to_string()))?;
    Ok(written)
}

// ============================================================================
// SECTION: Dump Parsing
// ============================================================================

/// Reads a dump into numbered, non-empty lines.
fn dump_lines(dump: &Path) -> Result<Vec<(usize, String)>, ConvertError> {
    let file = File::open(dump)
        .map_err(|err| ConvertError::Io(format!("{}: {err}", dump.display())))?;
    let mut lines = Vec::new();
    for (position, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|err| ConvertError::Io(format!("{}: {err}", dump.display())))?;
        if !line.trim().is_empty() {
            lines.push((position + 1, line));
        }
    }
    Ok(lines)
}

/// Parses one dump line as a JSON array.
fn parse_line(dump: &Path, number: usize, line: &str) -> Result<Vec<Value>, ConvertError> {
    serde_json::from_str(line).map_err(|err| ConvertError::Parse {
        path: dump.to_path_buf(),
        line: number,
        message: format!("line is not a JSON array: {err}"),
    })
}

/// Splits a dump row into its expected two elements.
fn two_elements<'row>(
    dump: &Path,
    number: usize,
    row: &'row [Value],
) -> Result<[&'row Value; 2], ConvertError> {
    match row {
        [first, second] => Ok([first, second]),
        _ => Err(ConvertError::Parse {
            path: dump.to_path_buf(),
            line: number,
            message: format!("expected a 2-element array, found {} elements", row.len()),
        }),
    }
}

/// Renders the dumped structural hash as decimal text.
///
/// Dumps written by different producers carry the hash either as a JSON
/// number or as a string; both normalize to the same stored text.
fn shash_text(dump: &Path, number: usize, value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number_value) => Ok(number_value.to_string()),
        _ => Err(ConvertError::Parse {
            path: dump.to_path_buf(),
            line: number,
            message: "shash element is neither a string nor a number".to_string(),
        }),
    }
}
