/*!
 * Round-Robin Scheduler
 * Circular scan of the process table starting after the last dispatched slot
 */

use crate::core::config::ResumePolicy;
use crate::core::errors::InvariantViolation;
use crate::core::types::{ProcessIndex, ProcessState, ResumePoint};
use crate::monitoring::KernelStats;
use crate::process::KernelState;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one scheduling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// No READY record; nothing was touched
    Idle,
    /// `next` now owns the CPU
    Dispatched {
        next: ProcessIndex,
        preempted: Option<ProcessIndex>,
        delivered: Option<ResumePoint>,
    },
}

/// Round-robin policy. Reads record states; never touches the blocked queue
/// or the I/O owner.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    resume_policy: ResumePolicy,
    stats: Arc<KernelStats>,
}

impl RoundRobin {
    pub fn new(resume_policy: ResumePolicy, stats: Arc<KernelStats>) -> Self {
        Self {
            resume_policy,
            stats,
        }
    }

    pub fn resume_policy(&self) -> ResumePolicy {
        self.resume_policy
    }

    /// First READY index in circular order after `current`, ending on
    /// `current` itself
    pub fn select_next(state: &KernelState) -> Option<ProcessIndex> {
        let n = state.table.count();
        if n == 0 {
            return None;
        }
        let start = state.current.map_or(0, |c| (c + 1) % n);

        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&i| matches!(state.table.state(i), Ok(ProcessState::Ready)))
    }

    pub fn schedule(&self, state: &mut KernelState) -> Result<ScheduleOutcome, InvariantViolation> {
        let Some(next) = Self::select_next(state) else {
            match state.running() {
                Some(current) => {
                    debug!(index = current, "No other READY process, A{} keeps the CPU", current)
                }
                None => {
                    self.stats.inc_idle_schedules();
                    info!("No READY process, waiting...");
                }
            }
            return Ok(ScheduleOutcome::Idle);
        };

        // A BLOCKED current process already left contention in the syscall
        // handler; only a RUNNING one is preempted.
        let mut preempted = None;
        if let Some(current) = state.current.filter(|&c| c != next) {
            let record = state.table.get_mut(current)?;
            if record.state() == ProcessState::Running {
                info!(index = current, pid = record.pid(), "Preempting process A{}", current);
                record.control().suspend();
                record.set_state(ProcessState::Ready);
                self.stats.inc_preemptions();
                preempted = Some(current);
            }
        }

        let record = state.table.get_mut(next)?;
        record.set_state(ProcessState::Running);
        state.current = Some(next);

        // Delivered before resume so the first instruction sees it
        let mut delivered = None;
        if let Some(captured) = record.take_resume_point() {
            let point = self.resume_policy.apply(captured);
            match record.channel().deliver_resume_point(point) {
                Ok(()) => {
                    debug!(index = next, resume_point = point, "Resume point delivered");
                    self.stats.inc_resume_points_delivered();
                    delivered = Some(point);
                }
                Err(violation) => {
                    warn!(index = next, error = %violation, "Resume point not delivered");
                    self.stats.inc_protocol_violations();
                }
            }
        }

        info!(index = next, pid = record.pid(), "Executing process A{}", next);
        record.control().resume();
        self.stats.inc_dispatches();

        Ok(ScheduleOutcome::Dispatched {
            next,
            preempted,
            delivered,
        })
    }
}
