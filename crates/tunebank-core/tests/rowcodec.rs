// tunebank-core/tests/rowcodec.rs
// ============================================================================
// Module: Row Codec Tests
// Description: Validate the flat textual row forms and their failure modes.
// Purpose: Ensure persisted rows decode exactly or fail as corruption.
// Dependencies: tunebank-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises the workload and record row codecs: the length-prefixed base64
//! module blob, the JSON column texts, and corruption detection on tampered
//! payloads. Adversarial inputs model untrusted storage contents.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::json;
use tunebank_core::ArgInfo;
use tunebank_core::DatabaseError;
use tunebank_core::JsonProgramCodec;
use tunebank_core::ProgramCodec;
use tunebank_core::RecordRow;
use tunebank_core::Target;
use tunebank_core::Trace;
use tunebank_core::TuningRecord;
use tunebank_core::Workload;
use tunebank_core::WorkloadIndex;
use tunebank_core::WorkloadRow;
use tunebank_core::core::workload::normalize_shash;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn workload(program: serde_json::Value) -> Workload<serde_json::Value> {
    let codec = JsonProgramCodec::new();
    let shash = normalize_shash(codec.structural_hash(&program));
    Workload::new(program, shash)
}

fn sample_record(workload: &Arc<Workload<serde_json::Value>>) -> TuningRecord<serde_json::Value> {
    TuningRecord::new(
        Arc::clone(workload),
        Trace::new(json!([["split", 8], ["reorder", [0, 2, 1]]])),
        Some(vec![1.5, 2.5]),
        Target::new(json!({ "kind": "llvm", "num_cores": 4 })),
        vec![ArgInfo::new(json!({ "dtype": "float32", "shape": [8, 8] }))],
    )
}

// ============================================================================
// SECTION: Workload Row Tests
// ============================================================================

#[test]
fn workload_row_round_trips_the_program() {
    let codec = JsonProgramCodec::new();
    let original = workload(json!({ "op": "matmul", "quote": "needs 'escaping'" }));
    let row = WorkloadRow::encode(&codec, &original).unwrap();
    assert_eq!(row.shash, original.shash().to_string());
    let restored = row.decode(&codec).unwrap();
    assert!(codec.structural_equal(original.module(), &restored));
}

#[test]
fn workload_row_rejects_non_base64_blob() {
    let codec = JsonProgramCodec::new();
    let row = WorkloadRow {
        shash: "0".to_string(),
        module: "not base64!".to_string(),
    };
    assert!(matches!(row.decode(&codec), Err(DatabaseError::Corrupt(_))));
}

#[test]
fn workload_row_rejects_truncated_length_prefix() {
    let codec = JsonProgramCodec::new();
    let original = workload(json!({ "op": "matmul" }));
    let mut row = WorkloadRow::encode(&codec, &original).unwrap();
    // Chop the payload after re-encoding: prefix no longer matches.
    use base64::Engine;
    let mut framed = base64::engine::general_purpose::STANDARD.decode(&row.module).unwrap();
    framed.truncate(framed.len() - 2);
    row.module = base64::engine::general_purpose::STANDARD.encode(framed);
    assert!(matches!(row.decode(&codec), Err(DatabaseError::Corrupt(_))));
}

#[test]
fn workload_row_rejects_blob_shorter_than_prefix() {
    let codec = JsonProgramCodec::new();
    use base64::Engine;
    let row = WorkloadRow {
        shash: "0".to_string(),
        module: base64::engine::general_purpose::STANDARD.encode([1_u8, 2, 3]),
    };
    assert!(matches!(row.decode(&codec), Err(DatabaseError::Corrupt(_))));
}

// ============================================================================
// SECTION: Record Row Tests
// ============================================================================

#[test]
fn record_row_round_trips_all_fields() {
    let handle = Arc::new(workload(json!({ "op": "matmul" })));
    let record = sample_record(&handle);
    let row = RecordRow::encode(WorkloadIndex::new(0), &record).unwrap();
    assert_eq!(row.workload_index, 0);
    assert_eq!(row.run_secs, "[1.5,2.5]");
    let restored = row.decode(Arc::clone(&handle)).unwrap();
    assert_eq!(restored.trace(), record.trace());
    assert_eq!(restored.run_secs(), record.run_secs());
    assert_eq!(restored.target(), record.target());
    assert_eq!(restored.args_info(), record.args_info());
}

#[test]
fn unmeasured_record_encodes_null_run_secs() {
    let handle = Arc::new(workload(json!({ "op": "matmul" })));
    let record = TuningRecord::new(
        Arc::clone(&handle),
        Trace::new(json!([])),
        None,
        Target::new(json!({ "kind": "llvm" })),
        Vec::new(),
    );
    let row = RecordRow::encode(WorkloadIndex::new(0), &record).unwrap();
    assert_eq!(row.run_secs, "null");
    let restored = row.decode(handle).unwrap();
    assert!(restored.run_secs().is_none());
}

#[test]
fn record_row_rejects_malformed_columns() {
    let handle = Arc::new(workload(json!({ "op": "matmul" })));
    let good = RecordRow::encode(WorkloadIndex::new(0), &sample_record(&handle)).unwrap();

    let mut bad_trace = good.clone();
    bad_trace.trace = "{not json".to_string();
    assert!(matches!(bad_trace.decode(Arc::clone(&handle)), Err(DatabaseError::Corrupt(_))));

    let mut bad_secs = good.clone();
    bad_secs.run_secs = "[\"fast\"]".to_string();
    assert!(matches!(bad_secs.decode(Arc::clone(&handle)), Err(DatabaseError::Corrupt(_))));

    let mut bad_args = good;
    bad_args.args_info = "{}".to_string();
    assert!(matches!(bad_args.decode(handle), Err(DatabaseError::Corrupt(_))));
}
