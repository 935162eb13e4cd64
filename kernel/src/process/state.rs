/*!
 * Kernel State
 * The single owned value the dispatcher and scheduler operate on
 */

use super::blocked_queue::BlockedQueue;
use super::table::ProcessTable;
use super::types::ProcessRecord;
use crate::core::types::{ProcessIndex, ProcessState};

/// Process table, blocked queue, CPU owner and I/O owner
#[derive(Debug)]
pub struct KernelState {
    pub(crate) table: ProcessTable,
    pub(crate) blocked: BlockedQueue,
    /// Last process dispatched; the round-robin scan starts after it
    pub(crate) current: Option<ProcessIndex>,
    /// Process the I/O controller is servicing
    pub(crate) in_service: Option<ProcessIndex>,
}

impl KernelState {
    /// All records READY, queue empty, nothing running, no I/O in flight
    pub fn new(records: Vec<ProcessRecord>) -> Self {
        let blocked = BlockedQueue::with_capacity(records.len());
        Self {
            table: ProcessTable::new(records),
            blocked,
            current: None,
            in_service: None,
        }
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    /// Direct table access, for setting up scenarios
    pub fn table_mut(&mut self) -> &mut ProcessTable {
        &mut self.table
    }

    pub fn blocked_queue(&self) -> &BlockedQueue {
        &self.blocked
    }

    pub fn current(&self) -> Option<ProcessIndex> {
        self.current
    }

    /// Index of the RUNNING record, if any
    pub fn running(&self) -> Option<ProcessIndex> {
        self.current
            .filter(|&i| matches!(self.table.state(i), Ok(ProcessState::Running)))
    }

    pub fn io_in_progress(&self) -> bool {
        self.in_service.is_some()
    }

    pub fn in_service(&self) -> Option<ProcessIndex> {
        self.in_service
    }

    /// Check the structural invariants, describing the first one broken
    pub fn check_invariants(&self) -> Result<(), String> {
        let running = self.table.indices_in(ProcessState::Running);
        if running.len() > 1 {
            return Err(format!("more than one RUNNING record: {:?}", running));
        }
        if let Some(&i) = running.first() {
            if self.current != Some(i) {
                return Err(format!("record {} RUNNING but current is {:?}", i, self.current));
            }
        }

        for (i, record) in self.table.iter().enumerate() {
            let queued = self.blocked.contains(i);
            let serviced = self.in_service == Some(i);
            if queued && serviced {
                return Err(format!("record {} both queued and in service", i));
            }
            if record.io_pending() != (queued || serviced) {
                return Err(format!(
                    "record {} io_pending={} but queued={} in_service={}",
                    i,
                    record.io_pending(),
                    queued,
                    serviced
                ));
            }
            if (queued || serviced) && record.state() != ProcessState::Blocked {
                return Err(format!("record {} awaiting I/O while {}", i, record.state()));
            }
        }

        let queued = self.blocked.to_vec();
        for (pos, i) in queued.iter().enumerate() {
            if queued[pos + 1..].contains(i) {
                return Err(format!("record {} queued twice", i));
            }
        }

        Ok(())
    }
}
