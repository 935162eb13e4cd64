/*!
 * Process Table
 * Fixed-size, index-addressed set of process records
 */

use super::types::ProcessRecord;
use crate::core::errors::InvariantViolation;
use crate::core::types::{ProcessIndex, ProcessState};

/// Authoritative process records. Size is fixed at construction.
///
/// Bounds are checked; every other invariant is the caller's job.
#[derive(Debug)]
pub struct ProcessTable {
    records: Vec<ProcessRecord>,
}

impl ProcessTable {
    pub fn new(records: Vec<ProcessRecord>) -> Self {
        Self { records }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, index: ProcessIndex) -> Result<&ProcessRecord, InvariantViolation> {
        let len = self.records.len();
        self.records
            .get(index)
            .ok_or(InvariantViolation::IndexOutOfBounds { index, len })
    }

    pub(crate) fn get_mut(
        &mut self,
        index: ProcessIndex,
    ) -> Result<&mut ProcessRecord, InvariantViolation> {
        let len = self.records.len();
        self.records
            .get_mut(index)
            .ok_or(InvariantViolation::IndexOutOfBounds { index, len })
    }

    /// Overwrite a record's state with no transition checks
    pub fn set_state(
        &mut self,
        index: ProcessIndex,
        state: ProcessState,
    ) -> Result<(), InvariantViolation> {
        self.get_mut(index)?.set_state(state);
        Ok(())
    }

    pub fn state(&self, index: ProcessIndex) -> Result<ProcessState, InvariantViolation> {
        self.get(index).map(ProcessRecord::state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.iter()
    }

    /// Indices of records currently in `state`, in table order
    pub fn indices_in(&self, state: ProcessState) -> Vec<ProcessIndex> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.state() == state)
            .map(|(i, _)| i)
            .collect()
    }
}
