// tunebank-core/src/core/workload.rs
// ============================================================================
// Module: Tunebank Workloads
// Description: Structurally identified program representations under tuning.
// Purpose: Pair an opaque program with its unsigned structural hash and index.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Workload`] is an immutable program representation plus its derived
//! unsigned structural hash. Identity is structural equality of the program
//! as decided by the active program codec; the hash is an index and display
//! aid only and must never stand in for the equality check.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Workload Index
// ============================================================================

/// Insertion-order index of a workload in the workload table.
///
/// Indices start at 0, are assigned in commit order, and are never reused or
/// changed for the life of the backing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkloadIndex(usize);

impl WorkloadIndex {
    /// Creates a workload index from its 0-based position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the 0-based position.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkloadIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<usize> for WorkloadIndex {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

// ============================================================================
// SECTION: Workload
// ============================================================================

/// An immutable program representation with its unsigned structural hash.
#[derive(Debug, Clone)]
pub struct Workload<P> {
    /// Opaque program representation.
    module: P,
    /// Unsigned structural hash derived from the codec's signed hash.
    shash: u64,
}

impl<P> Workload<P> {
    /// Creates a workload from a program and its precomputed unsigned hash.
    #[must_use]
    pub const fn new(module: P, shash: u64) -> Self {
        Self { module, shash }
    }

    /// Returns the program representation.
    pub const fn module(&self) -> &P {
        &self.module
    }

    /// Returns the unsigned structural hash.
    #[must_use]
    pub const fn shash(&self) -> u64 {
        self.shash
    }
}

// ============================================================================
// SECTION: Hash Normalization
// ============================================================================

/// Normalizes a codec's signed structural hash to the unsigned range used in
/// persisted rows and display output.
#[must_use]
pub const fn normalize_shash(signed: i64) -> u64 {
    signed.cast_unsigned()
}
