/*!
 * Application
 *
 * A simulated user program: a counted instruction loop that issues blocking
 * READ/WRITE syscalls at fixed program counters. It runs only while the
 * kernel lets it and takes its next instruction offset from the kernel after
 * every blocking call.
 */

use crate::core::limits::{READ_SYSCALL_POINTS, WRITE_SYSCALL_POINTS};
use crate::core::types::{OperationKind, Pid, ProcessIndex, ResumePoint};
use crate::interrupts::{EventSender, InterruptEvent};
use crate::ipc::{ProcessEndpoint, SyscallContext};
use crate::process::RunGate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Syscall issued by the program at `pc`, if any
pub fn syscall_at(pc: u32) -> Option<OperationKind> {
    if READ_SYSCALL_POINTS.contains(&pc) {
        Some(OperationKind::Read)
    } else if WRITE_SYSCALL_POINTS.contains(&pc) {
        Some(OperationKind::Write)
    } else {
        None
    }
}

/// What an application did before it finished or was stopped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationReport {
    pub index: ProcessIndex,
    pub pid: Pid,
    pub instructions_executed: u32,
    pub syscalls: Vec<SyscallContext>,
    pub resume_points: Vec<ResumePoint>,
    pub completed: bool,
}

/// One application unit
pub struct Application {
    index: ProcessIndex,
    pid: Pid,
    endpoint: ProcessEndpoint,
    gate: RunGate,
    events: EventSender,
    max_iterations: u32,
    instruction_time: Duration,
}

impl Application {
    pub fn new(
        index: ProcessIndex,
        pid: Pid,
        endpoint: ProcessEndpoint,
        gate: RunGate,
        events: EventSender,
    ) -> Self {
        Self {
            index,
            pid,
            endpoint,
            gate,
            events,
            max_iterations: crate::core::limits::DEFAULT_MAX_ITERATIONS,
            instruction_time: crate::core::limits::DEFAULT_INSTRUCTION_TIME,
        }
    }

    pub fn with_program(mut self, max_iterations: u32, instruction_time: Duration) -> Self {
        self.max_iterations = max_iterations;
        self.instruction_time = instruction_time;
        self
    }

    pub async fn run(mut self) -> ApplicationReport {
        let mut report = ApplicationReport {
            index: self.index,
            pid: self.pid,
            ..Default::default()
        };
        info!(index = self.index, pid = self.pid, "App A{} started", self.index);

        let mut pc: u32 = 0;
        let mut last_syscall: Option<u32> = None;

        loop {
            if self.gate.wait_running().await.is_err() {
                warn!(index = self.index, "Run signal dropped, app stopping");
                return report;
            }

            // Opportunistic drain once per quantum
            if let Some(point) = self.endpoint.try_recv_resume_point() {
                debug!(index = self.index, resume_point = point, "Jumping to resume point");
                report.resume_points.push(point);
                pc = point;
            }

            if pc >= self.max_iterations {
                break;
            }

            info!(index = self.index, pc, "App A{} executing instruction (PC={})", self.index, pc);
            report.instructions_executed += 1;

            let mut next_pc = pc + 1;

            // A re-executed syscall instruction does not issue the call twice
            if let Some(op) = syscall_at(pc).filter(|_| last_syscall != Some(pc)) {
                let mut seen = self.gate.state().resumes;
                let ctx = SyscallContext::new(pc, op);
                info!(index = self.index, pc, op = %op, "App A{} (PC={}): syscall {} on disk D1", self.index, pc, op);

                // Context first, then the interrupt
                if self.endpoint.send_syscall_context(ctx).is_err()
                    || self
                        .events
                        .send(InterruptEvent::SyscallRequest { index: self.index })
                        .is_err()
                {
                    warn!(index = self.index, "Kernel is gone, app stopping");
                    return report;
                }
                report.syscalls.push(ctx);
                last_syscall = Some(pc);

                // Dispatches already queued ahead of the syscall event can
                // wake us first; only the one after the kernel blocked and
                // unblocked us carries a resume point.
                next_pc = loop {
                    let Ok(state) = self.gate.wait_resumed_after(seen).await else {
                        return report;
                    };
                    if let Some(point) = self.endpoint.try_recv_resume_point() {
                        report.resume_points.push(point);
                        break point;
                    }
                    debug!(index = self.index, pc, "Resumed before syscall was serviced, waiting");
                    seen = state.resumes;
                };
            }

            pc = next_pc;
            tokio::time::sleep(self.instruction_time).await;
        }

        info!(index = self.index, pid = self.pid, "App A{} finished", self.index);
        report.completed = true;
        report
    }
}
