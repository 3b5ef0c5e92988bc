// tunebank-core/tests/json_codec.rs
// ============================================================================
// Module: JSON Program Codec Tests
// Description: Validate canonicalization, hashing, and equality semantics.
// Purpose: Ensure the reference dialect honors the ProgramCodec invariants.
// Dependencies: tunebank-core, serde_json
// ============================================================================

//! ## Overview
//! The JSON codec is the reference [`tunebank_core::ProgramCodec`]; these
//! tests pin its observable contract: accessory spans are ignored for
//! identity, serialization is canonical, and signed hashes normalize to the
//! unsigned range losslessly.

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

use serde_json::json;
use tunebank_core::JsonProgramCodec;
use tunebank_core::ProgramCodec;
use tunebank_core::core::workload::normalize_shash;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn serialize_deserialize_round_trips_structurally() {
    let codec = JsonProgramCodec::new();
    let program = json!({ "op": "conv2d", "inputs": [[1, 3, 8, 8], [4, 3, 3, 3]] });
    let bytes = codec.serialize(&program).unwrap();
    let restored = codec.deserialize(&bytes).unwrap();
    assert!(codec.structural_equal(&program, &restored));
}

#[test]
fn spans_are_stripped_from_identity_and_serialization() {
    let codec = JsonProgramCodec::new();
    let spanned = json!({
        "op": "conv2d",
        "body": { "op": "add", "span": { "line": 9 } },
        "span": { "line": 1 },
    });
    let bare = json!({ "op": "conv2d", "body": { "op": "add" } });
    assert!(codec.structural_equal(&spanned, &bare));
    assert_eq!(codec.structural_hash(&spanned), codec.structural_hash(&bare));
    assert_eq!(codec.serialize(&spanned).unwrap(), codec.serialize(&bare).unwrap());
}

#[test]
fn key_order_does_not_affect_identity() {
    let codec = JsonProgramCodec::new();
    let one = json!({ "a": 1, "b": 2 });
    let other = json!({ "b": 2, "a": 1 });
    assert!(codec.structural_equal(&one, &other));
    assert_eq!(codec.structural_hash(&one), codec.structural_hash(&other));
}

#[test]
fn different_programs_are_unequal() {
    let codec = JsonProgramCodec::new();
    let one = json!({ "op": "conv2d" });
    let other = json!({ "op": "dense" });
    assert!(!codec.structural_equal(&one, &other));
}

#[test]
fn hash_is_deterministic() {
    let codec = JsonProgramCodec::new();
    let program = json!({ "op": "dense", "units": 1000 });
    assert_eq!(codec.structural_hash(&program), codec.structural_hash(&program.clone()));
}

#[test]
fn normalize_shash_is_a_lossless_bit_cast() {
    assert_eq!(normalize_shash(0), 0);
    assert_eq!(normalize_shash(1), 1);
    assert_eq!(normalize_shash(-1), u64::MAX);
    assert_eq!(normalize_shash(i64::MIN), 1_u64 << 63);
}
