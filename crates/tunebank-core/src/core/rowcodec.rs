// tunebank-core/src/core/rowcodec.rs
// ============================================================================
// Module: Tunebank Row Codec
// Description: Flat textual row forms for workloads and tuning records.
// Purpose: Convert between in-memory records and persisted table columns.
// Dependencies: base64, serde_json, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Persisted rows are flat text columns. A workload row carries the unsigned
//! structural hash as decimal text and the serialized program as base64 over
//! an 8-byte little-endian length prefix followed by the raw bytes. A tuning
//! record row carries the workload index plus JSON texts for trace, run
//! times, target, and argument descriptors; `run_secs` is `null` when the
//! record has not been measured.
//!
//! Decoding a record row requires the already-resolved workload handle; a
//! row referencing an out-of-range workload index is a corruption error
//! raised by the caller that resolves the index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::core::record::ArgInfo;
use crate::core::record::Trace;
use crate::core::record::Target;
use crate::core::record::TuningRecord;
use crate::core::workload::Workload;
use crate::core::workload::WorkloadIndex;
use crate::interfaces::DatabaseError;
use crate::interfaces::ProgramCodec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Byte width of the little-endian length prefix on serialized programs.
const LENGTH_PREFIX_BYTES: usize = 8;

// ============================================================================
// SECTION: Workload Row
// ============================================================================

/// Textual form of one `workload` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRow {
    /// Unsigned structural hash rendered as decimal text.
    pub shash: String,
    /// Base64 of the length-prefixed serialized program bytes.
    pub module: String,
}

impl WorkloadRow {
    /// Encodes a workload into its persisted row form.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Invalid`] when the program cannot be
    /// serialized.
    pub fn encode<C: ProgramCodec>(
        codec: &C,
        workload: &Workload<C::Program>,
    ) -> Result<Self, DatabaseError> {
        let bytes = codec.serialize(workload.module())?;
        let size = u64::try_from(bytes.len())
            .map_err(|_| DatabaseError::Invalid("serialized program exceeds u64 range".to_string()))?;
        let mut framed = Vec::with_capacity(LENGTH_PREFIX_BYTES + bytes.len());
        framed.extend_from_slice(&size.to_le_bytes());
        framed.extend_from_slice(&bytes);
        Ok(Self {
            shash: workload.shash().to_string(),
            module: STANDARD.encode(framed),
        })
    }

    /// Decodes the serialized program out of a persisted row.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Corrupt`] when the base64 payload, the length
    /// prefix, or the program bytes fail to decode.
    pub fn decode<C: ProgramCodec>(&self, codec: &C) -> Result<C::Program, DatabaseError> {
        let framed = STANDARD
            .decode(&self.module)
            .map_err(|err| DatabaseError::Corrupt(format!("workload blob is not base64: {err}")))?;
        if framed.len() < LENGTH_PREFIX_BYTES {
            return Err(DatabaseError::Corrupt(
                "workload blob shorter than its length prefix".to_string(),
            ));
        }
        let (prefix, payload) = framed.split_at(LENGTH_PREFIX_BYTES);
        let mut size_bytes = [0_u8; LENGTH_PREFIX_BYTES];
        size_bytes.copy_from_slice(prefix);
        let size = u64::from_le_bytes(size_bytes);
        let expected = u64::try_from(payload.len())
            .map_err(|_| DatabaseError::Corrupt("workload blob exceeds u64 range".to_string()))?;
        if size != expected {
            return Err(DatabaseError::Corrupt(format!(
                "workload blob length prefix {size} does not match payload length {expected}"
            )));
        }
        Ok(codec.deserialize(payload)?)
    }
}

// ============================================================================
// SECTION: Record Row
// ============================================================================

/// Textual form of one `tuning_record` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    /// 0-based position of the referenced workload in insertion order.
    pub workload_index: usize,
    /// JSON text of the trace.
    pub trace: String,
    /// JSON text of the run-time samples: `null` or an array of seconds.
    pub run_secs: String,
    /// JSON text of the target descriptor.
    pub target: String,
    /// JSON text of the ordered argument descriptors.
    pub args_info: String,
}

impl RecordRow {
    /// Encodes a tuning record into its persisted row form.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Invalid`] when a field cannot be serialized.
    pub fn encode<P>(
        index: WorkloadIndex,
        record: &TuningRecord<P>,
    ) -> Result<Self, DatabaseError> {
        Ok(Self {
            workload_index: index.as_usize(),
            trace: to_json_text(record.trace().as_value())?,
            run_secs: serde_json::to_string(&record.run_secs())
                .map_err(|err| DatabaseError::Invalid(format!("run_secs encoding failed: {err}")))?,
            target: to_json_text(record.target().as_value())?,
            args_info: serde_json::to_string(
                &record.args_info().iter().map(ArgInfo::as_value).collect::<Vec<_>>(),
            )
            .map_err(|err| DatabaseError::Invalid(format!("args_info encoding failed: {err}")))?,
        })
    }

    /// Parses the run-time samples column.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Corrupt`] when the column is not `null` or a
    /// JSON array of numbers.
    pub fn parse_run_secs(&self) -> Result<Option<Vec<f64>>, DatabaseError> {
        serde_json::from_str(&self.run_secs)
            .map_err(|err| DatabaseError::Corrupt(format!("run_secs column is malformed: {err}")))
    }

    /// Decodes a full tuning record given the already-resolved workload.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Corrupt`] when any column fails to parse.
    pub fn decode<P>(&self, workload: Arc<Workload<P>>) -> Result<TuningRecord<P>, DatabaseError> {
        let trace = from_json_text(&self.trace, "trace")?;
        let run_secs = self.parse_run_secs()?;
        let target = from_json_text(&self.target, "target")?;
        let args: Vec<Value> = serde_json::from_str(&self.args_info)
            .map_err(|err| DatabaseError::Corrupt(format!("args_info column is malformed: {err}")))?;
        Ok(TuningRecord::new(
            workload,
            Trace::new(trace),
            run_secs,
            Target::new(target),
            args.into_iter().map(ArgInfo::new).collect(),
        ))
    }
}

// ============================================================================
// SECTION: JSON Helpers
// ============================================================================

/// Serializes an opaque payload value to JSON text.
fn to_json_text(value: &Value) -> Result<String, DatabaseError> {
    serde_json::to_string(value)
        .map_err(|err| DatabaseError::Invalid(format!("payload encoding failed: {err}")))
}

/// Parses an opaque payload column back into a JSON value.
fn from_json_text(text: &str, column: &str) -> Result<Value, DatabaseError> {
    serde_json::from_str(text)
        .map_err(|err| DatabaseError::Corrupt(format!("{column} column is malformed: {err}")))
}
