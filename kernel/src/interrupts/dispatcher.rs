/*!
 * Interrupt Dispatcher
 *
 * Turns timer ticks, syscall requests and I/O completions into transitions
 * on the kernel state. Every handler runs to completion and ends with a
 * scheduling decision.
 */

use super::controller::IoController;
use super::types::InterruptEvent;
use crate::core::config::ResumePolicy;
use crate::core::errors::{InvariantViolation, ProtocolViolation};
use crate::core::types::{ProcessIndex, ProcessState};
use crate::monitoring::KernelStats;
use crate::process::KernelState;
use crate::scheduler::{RoundRobin, ScheduleOutcome};
use std::sync::Arc;
use tracing::{debug_span, error, info, warn};

/// Sole owner of the kernel state
pub struct Dispatcher {
    state: KernelState,
    scheduler: RoundRobin,
    controller: Arc<dyn IoController>,
    stats: Arc<KernelStats>,
}

impl Dispatcher {
    pub fn new(
        state: KernelState,
        controller: Arc<dyn IoController>,
        resume_policy: ResumePolicy,
    ) -> Self {
        let stats = Arc::new(KernelStats::new());
        Self {
            state,
            scheduler: RoundRobin::new(resume_policy, Arc::clone(&stats)),
            controller,
            stats,
        }
    }

    pub fn state(&self) -> &KernelState {
        &self.state
    }

    /// Mutable state access, for setting up scenarios before events flow
    pub fn state_mut(&mut self) -> &mut KernelState {
        &mut self.state
    }

    pub fn stats(&self) -> Arc<KernelStats> {
        Arc::clone(&self.stats)
    }

    /// Handle one event to completion
    pub fn handle(&mut self, event: InterruptEvent) -> ScheduleOutcome {
        let _span = debug_span!("interrupt", irq = event.name()).entered();

        match event {
            InterruptEvent::TimerTick => info!("IRQ0 (end of time slice)"),
            InterruptEvent::SyscallRequest { index } => self.on_syscall_request(index),
            InterruptEvent::IoComplete => self.on_io_complete(),
        }

        self.schedule()
    }

    /// Run the scheduler once
    pub fn schedule(&mut self) -> ScheduleOutcome {
        match self.scheduler.schedule(&mut self.state) {
            Ok(outcome) => outcome,
            Err(violation) => {
                self.invariant_violated(violation);
                ScheduleOutcome::Idle
            }
        }
    }

    fn on_syscall_request(&mut self, index: ProcessIndex) {
        self.stats.inc_syscalls();

        // The index comes from the sender, not from kernel state
        let len = self.state.table.count();
        let record = match self.state.table.get_mut(index) {
            Ok(record) => record,
            Err(_) => {
                return self.protocol_violated(ProtocolViolation::UnknownProcess { index, len })
            }
        };

        if record.state() == ProcessState::Blocked {
            // Consume the context the rejected request wrote so the next
            // accepted syscall reads its own.
            let drained = record.channel().read_syscall_context();
            let state = record.state();
            self.protocol_violated(ProtocolViolation::UnexpectedSyscall { index, state });
            match drained {
                Ok(_) | Err(ProtocolViolation::NoContext(_)) => {}
                Err(violation) => self.protocol_violated(violation),
            }
            return;
        }

        info!(index, pid = record.pid(), "IRQ2 (I/O syscall) from process A{}", index);

        match record.channel().read_syscall_context() {
            Ok(ctx) => {
                info!(
                    index,
                    op = %ctx.operation,
                    resume_point = ctx.resume_point,
                    "Saved context of process A{}",
                    index
                );
                record.save_context(ctx);
            }
            // Still blocked; with no saved point it resumes from its own
            // counter.
            Err(violation) => self.protocol_violated(violation),
        }

        let record = match self.state.table.get_mut(index) {
            Ok(record) => record,
            Err(violation) => return self.invariant_violated(violation),
        };
        record.control().suspend();
        record.set_state(ProcessState::Blocked);
        record.set_io_pending(true);

        if let Err(violation) = self.state.blocked.enqueue(index) {
            self.invariant_violated(violation);
        }

        if !self.state.io_in_progress() {
            self.start_next_io();
        }
    }

    fn on_io_complete(&mut self) {
        match self.state.in_service.take() {
            Some(done) => match self.state.table.get_mut(done) {
                Ok(record) => {
                    record.set_state(ProcessState::Ready);
                    record.set_io_pending(false);
                    self.stats.inc_io_completed();
                    info!(index = done, pid = record.pid(), "IRQ1 (I/O of process A{} completed)", done);
                }
                Err(violation) => self.invariant_violated(violation),
            },
            None => self.protocol_violated(ProtocolViolation::SpuriousIoComplete),
        }

        self.start_next_io();
    }

    /// Hand the head of the blocked queue to the controller
    fn start_next_io(&mut self) {
        let Some(next) = self.state.blocked.dequeue() else {
            return;
        };

        match self.state.table.get_mut(next) {
            Ok(record) => {
                record.set_io_pending(true);
                self.state.in_service = Some(next);
                info!(index = next, "Starting I/O for process A{}", next);
                self.controller.start_io(next);
                self.stats.inc_io_started();
            }
            Err(violation) => self.invariant_violated(violation),
        }
    }

    fn protocol_violated(&self, violation: ProtocolViolation) {
        warn!(error = %violation, "Protocol violation");
        self.stats.inc_protocol_violations();
    }

    fn invariant_violated(&self, violation: InvariantViolation) {
        error!(error = %violation, "Kernel invariant violated");
        if cfg!(debug_assertions) {
            panic!("kernel invariant violated: {}", violation);
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state)
            .field("resume_policy", &self.scheduler.resume_policy())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
