// tunebank-core/src/interfaces/mod.rs
// ============================================================================
// Module: Tunebank Interfaces
// Description: Backend-agnostic interfaces for program dialects and databases.
// Purpose: Define the contract surfaces used by Tunebank store backends.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how Tunebank integrates with a compiler toolchain and a
//! storage backend without embedding either. The store never inspects program
//! internals: serialization, structural hashing, and structural equality are
//! capabilities supplied by a [`ProgramCodec`] implementation. Implementations
//! must be deterministic and fail closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::record::TuningRecord;
use crate::core::workload::Workload;

// ============================================================================
// SECTION: Program Codec
// ============================================================================

/// Program codec errors.
#[derive(Debug, Error)]
pub enum ProgramCodecError {
    /// Program serialization failed.
    #[error("program serialization failed: {0}")]
    Serialize(String),
    /// Program deserialization failed.
    #[error("program deserialization failed: {0}")]
    Deserialize(String),
}

/// Capability interface over an external compiler toolchain's program
/// representation.
///
/// # Invariants
/// - `deserialize(serialize(p))` is structurally equal to `p`.
/// - `structural_equal` is authoritative for identity; two programs with the
///   same `structural_hash` are not necessarily equal.
/// - Structural identity ignores accessory data carried by the
///   representation (source locations and similar annotations).
pub trait ProgramCodec {
    /// Opaque program representation under tuning.
    type Program: Clone;

    /// Serializes a program into its canonical byte form.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramCodecError::Serialize`] when the program cannot be
    /// serialized.
    fn serialize(&self, program: &Self::Program) -> Result<Vec<u8>, ProgramCodecError>;

    /// Deserializes a program from its canonical byte form.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramCodecError::Deserialize`] when the bytes do not
    /// decode to a program.
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Program, ProgramCodecError>;

    /// Returns the signed structural hash of a program.
    fn structural_hash(&self, program: &Self::Program) -> i64;

    /// Returns whether two programs are structurally equal.
    fn structural_equal(&self, left: &Self::Program, right: &Self::Program) -> bool;
}

// ============================================================================
// SECTION: Database Errors
// ============================================================================

/// Record database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Database misconfiguration detected before any I/O.
    #[error("database configuration error: {0}")]
    Config(String),
    /// Filesystem I/O error.
    #[error("database io error: {0}")]
    Io(String),
    /// Storage engine error.
    #[error("database engine error: {0}")]
    Db(String),
    /// Persisted data is corrupted or fails to decode.
    #[error("database corruption: {0}")]
    Corrupt(String),
    /// Data handed to the database is invalid.
    #[error("database invalid data: {0}")]
    Invalid(String),
    /// A tuning record referenced a workload that was never committed.
    #[error("unknown workload: shash {shash}")]
    UnknownWorkload {
        /// Unsigned structural hash of the unknown workload.
        shash: u64,
    },
}

impl From<ProgramCodecError> for DatabaseError {
    fn from(error: ProgramCodecError) -> Self {
        match error {
            ProgramCodecError::Serialize(message) => Self::Invalid(message),
            ProgramCodecError::Deserialize(message) => Self::Corrupt(message),
        }
    }
}

// ============================================================================
// SECTION: Record Database
// ============================================================================

/// Persistent database of workloads and tuning records.
///
/// Mutating operations take `&mut self`: the database is not internally
/// synchronized and callers sharing one instance across threads must
/// serialize access themselves.
pub trait RecordDatabase<C: ProgramCodec> {
    /// Returns whether a structurally equal workload has been committed.
    fn has_workload(&self, program: &C::Program) -> bool;

    /// Commits a workload, returning the canonical handle.
    ///
    /// Committing a structurally equal program twice returns the existing
    /// entry unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when the workload cannot be persisted.
    fn commit_workload(
        &mut self,
        program: C::Program,
    ) -> Result<Arc<Workload<C::Program>>, DatabaseError>;

    /// Commits a tuning record for a previously committed workload.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::UnknownWorkload`] when the record's workload
    /// was never committed, before anything is written.
    fn commit_tuning_record(
        &mut self,
        record: &TuningRecord<C::Program>,
    ) -> Result<(), DatabaseError>;

    /// Returns all tuning records, optionally filtered to one workload.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when rows cannot be fetched or decoded.
    fn get_all_tuning_records(
        &self,
        workload: Option<&Workload<C::Program>>,
    ) -> Result<Vec<TuningRecord<C::Program>>, DatabaseError>;

    /// Returns the best `top_k` valid records for a workload, ascending by
    /// mean measured run time.
    ///
    /// An empty result means "no valid records" and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when rows cannot be fetched or decoded.
    fn get_top_k(
        &self,
        workload: &Workload<C::Program>,
        top_k: usize,
    ) -> Result<Vec<TuningRecord<C::Program>>, DatabaseError>;

    /// Returns the total number of persisted tuning records, valid or not.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when the count cannot be fetched.
    fn size(&self) -> Result<usize, DatabaseError>;
}
