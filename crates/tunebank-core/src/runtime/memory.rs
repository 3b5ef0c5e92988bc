// tunebank-core/src/runtime/memory.rs
// ============================================================================
// Module: Tunebank In-Memory Database
// Description: Simple in-memory record database for tests and demos.
// Purpose: Provide a deterministic database implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`RecordDatabase`] for tests and local demos. Observable semantics match
//! the durable backends minus durability; it is not intended for production
//! use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::policy;
use crate::core::record::TuningRecord;
use crate::core::registry::WorkloadRegistry;
use crate::core::workload::Workload;
use crate::core::workload::WorkloadIndex;
use crate::core::workload::normalize_shash;
use crate::interfaces::DatabaseError;
use crate::interfaces::ProgramCodec;
use crate::interfaces::RecordDatabase;

// ============================================================================
// SECTION: In-Memory Database
// ============================================================================

/// In-memory record database for tests and demos.
pub struct InMemoryDatabase<C: ProgramCodec> {
    /// Workload registry over the active codec.
    registry: WorkloadRegistry<C>,
    /// Committed records tagged with their workload index, in commit order.
    records: Vec<(WorkloadIndex, TuningRecord<C::Program>)>,
}

impl<C: ProgramCodec> InMemoryDatabase<C> {
    /// Creates an empty in-memory database over the given codec.
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            registry: WorkloadRegistry::new(codec),
            records: Vec::new(),
        }
    }

    /// Returns the workload registry.
    pub const fn registry(&self) -> &WorkloadRegistry<C> {
        &self.registry
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

impl<C: ProgramCodec> RecordDatabase<C> for InMemoryDatabase<C> {
    fn has_workload(&self, program: &C::Program) -> bool {
        self.registry.has_workload(program)
    }

    fn commit_workload(
        &mut self,
        program: C::Program,
    ) -> Result<Arc<Workload<C::Program>>, DatabaseError> {
        Ok(self.registry.commit_workload(program).workload)
    }

    fn commit_tuning_record(
        &mut self,
        record: &TuningRecord<C::Program>,
    ) -> Result<(), DatabaseError> {
        let index = self
            .registry
            .index_of(record.workload().module())
            .ok_or_else(|| DatabaseError::UnknownWorkload {
                shash: normalize_shash(
                    self.registry.codec().structural_hash(record.workload().module()),
                ),
            })?;
        self.records.push((index, record.clone()));
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
        Ok(self
            .records
            .iter()
            .filter(|(index, _)| filter.is_none_or(|wanted| *index == wanted))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn get_top_k(
        &self,
        workload: &Workload<C::Program>,
        top_k: usize,
    ) -> Result<Vec<TuningRecord<C::Program>>, DatabaseError> {
        let wanted = self.resolve_index(workload)?;
        let candidates: Vec<(TuningRecord<C::Program>, Option<Vec<f64>>)> = self
            .records
            .iter()
            .filter(|(index, _)| *index == wanted)
            .map(|(_, record)| (record.clone(), record.run_secs().map(<[f64]>::to_vec)))
            .collect();
        Ok(policy::rank_top_k(candidates, top_k))
    }

    fn size(&self) -> Result<usize, DatabaseError> {
        Ok(self.records.len())
    }
}
