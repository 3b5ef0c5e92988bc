// tunebank-core/src/core/registry.rs
// ============================================================================
// Module: Tunebank Workload Registry
// Description: In-memory mapping from structural identity to workload index.
// Purpose: Deduplicate workloads and assign stable insertion-order indices.
// Dependencies: crate::core::workload, crate::interfaces
// ============================================================================

//! ## Overview
//! The registry is the in-process source of truth for "have we seen this
//! workload". Workloads are held in insertion order; a hash-bucketed index
//! keyed by the unsigned structural hash accelerates lookup, with every
//! bucket candidate re-verified by the codec's structural equality so hash
//! collisions never cause false deduplication.
//!
//! Index assignment replayed from persisted rows in storage order reproduces
//! the original assignment exactly; tuning records reference workloads by
//! that index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::workload::Workload;
use crate::core::workload::WorkloadIndex;
use crate::core::workload::normalize_shash;
use crate::interfaces::ProgramCodec;

// ============================================================================
// SECTION: Commit Outcome
// ============================================================================

/// Result of committing a workload to the registry.
#[derive(Debug)]
pub struct RegistryCommit<P> {
    /// Canonical workload handle (pre-existing when `created` is false).
    pub workload: Arc<Workload<P>>,
    /// Index assigned to the workload.
    pub index: WorkloadIndex,
    /// Whether a new entry was created by this commit.
    pub created: bool,
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// In-memory workload registry with structural-equality deduplication.
pub struct WorkloadRegistry<C: ProgramCodec> {
    /// Program codec supplying hashing and equality.
    codec: C,
    /// Workloads in insertion order; position is the assigned index.
    workloads: Vec<Arc<Workload<C::Program>>>,
    /// Unsigned structural hash to candidate positions in `workloads`.
    buckets: HashMap<u64, Vec<usize>>,
}

impl<C: ProgramCodec> WorkloadRegistry<C> {
    /// Creates an empty registry over the given codec.
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            workloads: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    /// Returns the program codec.
    pub const fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the number of registered workloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    /// Returns the workload at `index`, if assigned.
    #[must_use]
    pub fn get(&self, index: WorkloadIndex) -> Option<&Arc<Workload<C::Program>>> {
        self.workloads.get(index.as_usize())
    }

    /// Returns whether a structurally equal workload is registered.
    #[must_use]
    pub fn has_workload(&self, program: &C::Program) -> bool {
        self.find(program).is_some()
    }

    /// Returns the index of the structurally equal workload, if registered.
    #[must_use]
    pub fn index_of(&self, program: &C::Program) -> Option<WorkloadIndex> {
        self.find(program).map(WorkloadIndex::new)
    }

    /// Commits a workload, reusing the existing entry when a structurally
    /// equal program is already registered.
    pub fn commit_workload(&mut self, program: C::Program) -> RegistryCommit<C::Program> {
        let shash = normalize_shash(self.codec.structural_hash(&program));
        if let Some(position) = self.find_in_bucket(shash, &program) {
            return RegistryCommit {
                workload: Arc::clone(&self.workloads[position]),
                index: WorkloadIndex::new(position),
                created: false,
            };
        }
        let position = self.workloads.len();
        let workload = Arc::new(Workload::new(program, shash));
        self.workloads.push(Arc::clone(&workload));
        self.buckets.entry(shash).or_default().push(position);
        RegistryCommit {
            workload,
            index: WorkloadIndex::new(position),
            created: true,
        }
    }

    /// Finds the position of a structurally equal workload.
    fn find(&self, program: &C::Program) -> Option<usize> {
        let shash = normalize_shash(self.codec.structural_hash(program));
        self.find_in_bucket(shash, program)
    }

    /// Scans one hash bucket, verifying each candidate structurally.
    fn find_in_bucket(&self, shash: u64, program: &C::Program) -> Option<usize> {
        let bucket = self.buckets.get(&shash)?;
        bucket
            .iter()
            .copied()
            .find(|&position| self.codec.structural_equal(program, self.workloads[position].module()))
    }
}
