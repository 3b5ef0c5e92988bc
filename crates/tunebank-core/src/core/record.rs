// tunebank-core/src/core/record.rs
// ============================================================================
// Module: Tunebank Tuning Records
// Description: Candidate optimization strategies for committed workloads.
// Purpose: Carry trace, measurements, target, and argument metadata per trial.
// Dependencies: serde, serde_json, crate::core::workload
// ============================================================================

//! ## Overview
//! A [`TuningRecord`] is one candidate optimization strategy for exactly one
//! workload. The trace, target, and argument descriptors are opaque JSON
//! values produced by the external tuning loop; the store round-trips them
//! without interpretation. Records are append-only: re-measurement produces a
//! new record rather than mutating an old one, and duplicates are expected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::workload::Workload;

// ============================================================================
// SECTION: Opaque Payloads
// ============================================================================

/// Ordered sequence of transformation steps applied to a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(Value);

impl Trace {
    /// Wraps a serialized trace value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON value.
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Descriptor of the execution environment a record was measured on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(Value);

impl Target {
    /// Wraps a serialized target descriptor.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON value.
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Per-argument metadata descriptor (shape, dtype, and similar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgInfo(Value);

impl ArgInfo {
    /// Wraps a serialized argument descriptor.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON value.
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

// ============================================================================
// SECTION: Tuning Record
// ============================================================================

/// A candidate optimization strategy for one workload.
#[derive(Debug, Clone)]
pub struct TuningRecord<P> {
    /// Canonical handle of the workload this record belongs to.
    workload: Arc<Workload<P>>,
    /// Transformation-step sequence producing the program variant.
    trace: Trace,
    /// Measured run times in seconds; `None` means not yet measured.
    run_secs: Option<Vec<f64>>,
    /// Execution environment descriptor.
    target: Target,
    /// Ordered argument metadata descriptors.
    args_info: Vec<ArgInfo>,
}

impl<P> TuningRecord<P> {
    /// Creates a tuning record for a committed workload.
    #[must_use]
    pub const fn new(
        workload: Arc<Workload<P>>,
        trace: Trace,
        run_secs: Option<Vec<f64>>,
        target: Target,
        args_info: Vec<ArgInfo>,
    ) -> Self {
        Self {
            workload,
            trace,
            run_secs,
            target,
            args_info,
        }
    }

    /// Returns the workload handle.
    pub const fn workload(&self) -> &Arc<Workload<P>> {
        &self.workload
    }

    /// Returns the trace.
    pub const fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Returns the measured run times, if any.
    #[must_use]
    pub fn run_secs(&self) -> Option<&[f64]> {
        self.run_secs.as_deref()
    }

    /// Returns the target descriptor.
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Returns the argument descriptors.
    #[must_use]
    pub fn args_info(&self) -> &[ArgInfo] {
        &self.args_info
    }
}
