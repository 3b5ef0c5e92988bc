// tunebank-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Record Database
// Description: Durable RecordDatabase over two append-only SQLite tables.
// Purpose: Persist workloads and tuning records and serve ranked lookups.
// Dependencies: rusqlite, serde, tunebank-core
// ============================================================================

//! ## Overview
//! This module implements a durable [`RecordDatabase`] using `SQLite`. The
//! workload table deduplicates programs by structural identity; the tuning
//! record table is append-only with duplicates permitted. On construction
//! every persisted workload row is decoded and replayed into the in-memory
//! registry in storage order, so index assignment survives restarts
//! unchanged.
//!
//! Mutating operations take `&mut self`; the database holds no lock of its
//! own and one writer process at a time is assumed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::params;
use serde::Deserialize;
use tunebank_core::DatabaseError;
use tunebank_core::ProgramCodec;
use tunebank_core::RecordDatabase;
use tunebank_core::RecordRow;
use tunebank_core::TuningRecord;
use tunebank_core::Workload;
use tunebank_core::WorkloadIndex;
use tunebank_core::WorkloadRow;
use tunebank_core::core::policy;
use tunebank_core::core::registry::WorkloadRegistry;
use tunebank_core::core::workload::normalize_shash;

use crate::adapter;
use crate::adapter::ConnectionSettings;
use crate::adapter::SqliteJournalMode;
use crate::adapter::SqliteSyncMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Workload table file name derived from a work directory.
const DEFAULT_WORKLOAD_FILE: &str = "database_workload.sqlite";
/// Tuning record table file name derived from a work directory.
const DEFAULT_TUNING_RECORD_FILE: &str = "database_tuning_record.sqlite";
/// Column schema of the workload table.
const WORKLOAD_SCHEMA: &str = "shash text, mod text";
/// Column schema of the tuning record table.
const TUNING_RECORD_SCHEMA: &str =
    "workload_index int, trace text, run_secs text, target text, args_info text";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` record database.
///
/// Either `work_dir` or both explicit paths must be supplied. Explicit paths
/// given alongside `work_dir` are joined under it.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteDatabaseConfig {
    /// Path to the workload table file.
    #[serde(default)]
    pub path_workload: Option<PathBuf>,
    /// Path to the tuning record table file.
    #[serde(default)]
    pub path_tuning_record: Option<PathBuf>,
    /// Work directory used to derive unspecified paths.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for SqliteDatabaseConfig {
    fn default() -> Self {
        Self {
            path_workload: None,
            path_tuning_record: None,
            work_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl SqliteDatabaseConfig {
    /// Creates a config deriving both table paths from a work directory.
    #[must_use]
    pub fn for_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(work_dir.into()),
            ..Self::default()
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Resolved locations of the two table files.
#[derive(Debug, Clone)]
struct TablePaths {
    /// Workload table file.
    workload: PathBuf,
    /// Tuning record table file.
    tuning_record: PathBuf,
}

/// Resolves table paths from the config, creating the work directory.
fn resolve_paths(config: &SqliteDatabaseConfig) -> Result<TablePaths, DatabaseError> {
    if let Some(work_dir) = &config.work_dir {
        std::fs::create_dir_all(work_dir).map_err(|err| DatabaseError::Io(err.to_string()))?;
        let workload = match &config.path_workload {
            Some(path) => work_dir.join(path),
            None => work_dir.join(DEFAULT_WORKLOAD_FILE),
        };
        let tuning_record = match &config.path_tuning_record {
            Some(path) => work_dir.join(path),
            None => work_dir.join(DEFAULT_TUNING_RECORD_FILE),
        };
        return Ok(TablePaths {
            workload,
            tuning_record,
        });
    }
    match (&config.path_workload, &config.path_tuning_record) {
        (Some(workload), Some(tuning_record)) => Ok(TablePaths {
            workload: workload.clone(),
            tuning_record: tuning_record.clone(),
        }),
        (None, _) => Err(DatabaseError::Config(
            "`path_workload` is not specified and no work dir was given".to_string(),
        )),
        (_, None) => Err(DatabaseError::Config(
            "`path_tuning_record` is not specified and no work dir was given".to_string(),
        )),
    }
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// `SQLite`-backed record database.
pub struct SqliteDatabase<C: ProgramCodec> {
    /// Resolved table file locations.
    paths: TablePaths,
    /// Connection settings applied on every operation.
    settings: ConnectionSettings,
    /// In-memory workload registry, replayed from storage on construction.
    registry: WorkloadRegistry<C>,
}

impl<C: ProgramCodec> SqliteDatabase<C> {
    /// Opens the database, creating missing tables and replaying the
    /// persisted workload table into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Config`] when neither explicit paths nor a
    /// work directory were supplied, [`DatabaseError::Corrupt`] when a
    /// persisted workload fails to decode, and [`DatabaseError::Db`] or
    /// [`DatabaseError::Io`] on storage failures.
    pub fn new(config: &SqliteDatabaseConfig, codec: C) -> Result<Self, DatabaseError> {
        let paths = resolve_paths(config)?;
        let settings = ConnectionSettings {
            busy_timeout_ms: config.busy_timeout_ms,
            journal_mode: config.journal_mode,
            sync_mode: config.sync_mode,
        };
        let mut registry = WorkloadRegistry::new(codec);
        if paths.workload.is_file() {
            replay_workloads(&paths.workload, &settings, &mut registry)?;
        } else {
            adapter::create_table(&paths.workload, &settings, "workload", WORKLOAD_SCHEMA)?;
        }
        if !paths.tuning_record.is_file() {
            adapter::create_table(
                &paths.tuning_record,
                &settings,
                "tuning_record",
                TUNING_RECORD_SCHEMA,
            )?;
        }
        Ok(Self {
            paths,
            settings,
            registry,
        })
    }

    /// Returns the workload registry.
    pub const fn registry(&self) -> &WorkloadRegistry<C> {
        &self.registry
    }

    /// Returns the resolved workload table path.
    #[must_use]
    pub fn path_workload(&self) -> &Path {
        &self.paths.workload
    }

    /// Returns the resolved tuning record table path.
    #[must_use]
    pub fn path_tuning_record(&self) -> &Path {
        &self.paths.tuning_record
    }

    /// Fetches tuning record rows, optionally filtered to one workload index.
    fn fetch_record_rows(&self, filter: Option<WorkloadIndex>) -> Result<Vec<RecordRow>, DatabaseError> {
        let map_row = |row: &rusqlite::Row<'_>| {
            let workload_index: i64 = row.get(0)?;
            let trace: String = row.get(1)?;
            let run_secs: String = row.get(2)?;
            let target: String = row.get(3)?;
            let args_info: String = row.get(4)?;
            Ok((workload_index, trace, run_secs, target, args_info))
        };
        let raw = match filter {
            Some(index) => {
                let index = to_sql_index(index)?;
                adapter::fetch_all(
                    &self.paths.tuning_record,
                    &self.settings,
                    "SELECT workload_index, trace, run_secs, target, args_info FROM tuning_record \
                     WHERE workload_index = ?1 ORDER BY rowid",
                    params![index],
                    map_row,
                )?
            }
            None => adapter::fetch_all(
                &self.paths.tuning_record,
                &self.settings,
                "SELECT workload_index, trace, run_secs, target, args_info FROM tuning_record \
                 ORDER BY rowid",
                params![],
                map_row,
            )?,
        };
        raw.into_iter()
            .map(|(workload_index, trace, run_secs, target, args_info)| {
                let workload_index = usize::try_from(workload_index).map_err(|_| {
                    DatabaseError::Corrupt(format!(
                        "tuning record row has negative workload index {workload_index}"
                    ))
                })?;
                Ok(RecordRow {
                    workload_index,
                    trace,
                    run_secs,
                    target,
                    args_info,
                })
            })
            .collect()
    }

    /// Resolves the registry workload referenced by a stored row.
    fn resolve_row_workload(
        &self,
        row: &RecordRow,
    ) -> Result<Arc<Workload<C::Program>>, DatabaseError> {
        self.registry
            .get(WorkloadIndex::new(row.workload_index))
            .cloned()
            .ok_or_else(|| {
                DatabaseError::Corrupt(format!(
                    "tuning record row references workload index {} but only {} workloads are \
                     registered",
                    row.workload_index,
                    self.registry.len()
                ))
            })
    }

    /// Resolves the index of a committed workload.
    fn resolve_index(
        &self,
        workload: &Workload<C::Program>,
    ) -> Result<WorkloadIndex, DatabaseError> {
        self.registry
            .index_of(workload.module())
            .ok_or(DatabaseError::UnknownWorkload {
                shash: workload.shash(),
            })
    }
}

impl<C: ProgramCodec> RecordDatabase<C> for SqliteDatabase<C> {
    fn has_workload(&self, program: &C::Program) -> bool {
        self.registry.has_workload(program)
    }

    fn commit_workload(
        &mut self,
        program: C::Program,
    ) -> Result<Arc<Workload<C::Program>>, DatabaseError> {
        let commit = self.registry.commit_workload(program);
        if commit.created {
            let row = WorkloadRow::encode(self.registry.codec(), &commit.workload)?;
            adapter::execute(
                &self.paths.workload,
                &self.settings,
                "INSERT INTO workload VALUES (?1, ?2)",
                params![row.shash, row.module],
            )?;
        }
        Ok(commit.workload)
    }

    fn commit_tuning_record(
        &mut self,
        record: &TuningRecord<C::Program>,
    ) -> Result<(), DatabaseError> {
        let module = record.workload().module();
        let index = self.registry.index_of(module).ok_or_else(|| {
            DatabaseError::UnknownWorkload {
                shash: normalize_shash(self.registry.codec().structural_hash(module)),
            }
        })?;
        let row = RecordRow::encode(index, record)?;
        let workload_index = to_sql_index(index)?;
        adapter::execute(
            &self.paths.tuning_record,
            &self.settings,
            "INSERT INTO tuning_record VALUES (?1, ?2, ?3, ?4, ?5)",
            params![workload_index, row.trace, row.run_secs, row.target, row.args_info],
        )?;
        Ok(())
    }

    fn get_all_tuning_records(
        &self,
        workload: Option<&Workload<C::Program>>,
    ) -> Result<Vec<TuningRecord<C::Program>>, DatabaseError> {
        let filter = match workload {
            Some(workload) => Some(self.resolve_index(workload)?),
            None => None,
        };
        let rows = self.fetch_record_rows(filter)?;
        rows.into_iter()
            .map(|row| {
                let workload = self.resolve_row_workload(&row)?;
                row.decode(workload)
            })
            .collect()
    }

    fn get_top_k(
        &self,
        workload: &Workload<C::Program>,
        top_k: usize,
    ) -> Result<Vec<TuningRecord<C::Program>>, DatabaseError> {
        let index = self.resolve_index(workload)?;
        let rows = self.fetch_record_rows(Some(index))?;
        let candidates = rows
            .into_iter()
            .map(|row| {
                let run_secs = row.parse_run_secs()?;
                Ok((row, run_secs))
            })
            .collect::<Result<Vec<_>, DatabaseError>>()?;
        let ranked = policy::rank_top_k(candidates, top_k);
        ranked
            .into_iter()
            .map(|row| {
                let workload = self.resolve_row_workload(&row)?;
                row.decode(workload)
            })
            .collect()
    }

    fn size(&self) -> Result<usize, DatabaseError> {
        let counts = adapter::fetch_all(
            &self.paths.tuning_record,
            &self.settings,
            "SELECT COUNT(*) FROM tuning_record",
            params![],
            |row| row.get::<_, i64>(0),
        )?;
        let count = counts.first().copied().unwrap_or(0);
        usize::try_from(count)
            .map_err(|_| DatabaseError::Corrupt(format!("negative tuning record count {count}")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a workload index into its stored column form.
fn to_sql_index(index: WorkloadIndex) -> Result<i64, DatabaseError> {
    i64::try_from(index.as_usize())
        .map_err(|_| DatabaseError::Invalid(format!("workload index {index} exceeds i64 range")))
}

/// Replays every persisted workload row into the registry in storage order.
fn replay_workloads<C: ProgramCodec>(
    path: &Path,
    settings: &ConnectionSettings,
    registry: &mut WorkloadRegistry<C>,
) -> Result<(), DatabaseError> {
    let rows = adapter::fetch_all(path, settings, "SELECT shash, mod FROM workload ORDER BY rowid", params![], |row| {
        let shash: String = row.get(0)?;
        let module: String = row.get(1)?;
        Ok(WorkloadRow { shash, module })
    })?;
    for row in rows {
        let program = row.decode(registry.codec())?;
        let _ = registry.commit_workload(program);
    }
    Ok(())
}
