// tunebank-core/src/runtime/json_codec.rs
// ============================================================================
// Module: Tunebank JSON Program Codec
// Description: Reference program dialect over JSON values.
// Purpose: Provide a deterministic codec for tests, demos, and offline tools.
// Dependencies: serde_jcs, serde_json, sha2
// ============================================================================

//! ## Overview
//! [`JsonProgramCodec`] treats a program as an arbitrary JSON value. The
//! canonical serialized form is RFC 8785 (JCS) bytes computed after removing
//! accessory `"span"` entries, so two programs differing only in source
//! locations normalize to the same byte sequence. The structural hash is the
//! first eight bytes of SHA-256 over the canonical form, interpreted as a
//! signed little-endian integer the way toolchain hashes surface before the
//! store normalizes them to unsigned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;

use crate::interfaces::ProgramCodec;
use crate::interfaces::ProgramCodecError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Object key carrying accessory source-location data.
const ACCESSORY_KEY: &str = "span";

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Program codec over JSON values, for tests, demos, and offline tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonProgramCodec;

impl JsonProgramCodec {
    /// Creates a new JSON program codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the canonical byte form: JCS over the span-stripped value.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramCodecError::Serialize`] when canonicalization fails
    /// (non-finite numbers cannot be canonicalized).
    fn canonical_bytes(program: &Value) -> Result<Vec<u8>, ProgramCodecError> {
        let stripped = strip_accessory(program);
        serde_jcs::to_vec(&stripped).map_err(|err| ProgramCodecError::Serialize(err.to_string()))
    }
}

impl ProgramCodec for JsonProgramCodec {
    type Program = Value;

    fn serialize(&self, program: &Value) -> Result<Vec<u8>, ProgramCodecError> {
        Self::canonical_bytes(program)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, ProgramCodecError> {
        serde_json::from_slice(bytes).map_err(|err| ProgramCodecError::Deserialize(err.to_string()))
    }

    fn structural_hash(&self, program: &Value) -> i64 {
        match Self::canonical_bytes(program) {
            Ok(bytes) => {
                let digest = Sha256::digest(&bytes);
                let mut first = [0_u8; 8];
                first.copy_from_slice(&digest[..8]);
                i64::from_le_bytes(first)
            }
            Err(_) => 0,
        }
    }

    fn structural_equal(&self, left: &Value, right: &Value) -> bool {
        match (Self::canonical_bytes(left), Self::canonical_bytes(right)) {
            (Ok(left_bytes), Ok(right_bytes)) => left_bytes == right_bytes,
            _ => false,
        }
    }
}

// ============================================================================
// SECTION: Accessory Stripping
// ============================================================================

/// Removes accessory entries from every object in the value tree.
fn strip_accessory(value: &Value) -> Value {
    match value {
        Value::Object(entries) => {
            let stripped: Map<String, Value> = entries
                .iter()
                .filter(|(key, _)| key.as_str() != ACCESSORY_KEY)
                .map(|(key, entry)| (key.clone(), strip_accessory(entry)))
                .collect();
            Value::Object(stripped)
        }
        Value::Array(items) => Value::Array(items.iter().map(strip_accessory).collect()),
        other => other.clone(),
    }
}
