/*!
 * Process Types
 * Process control record
 */

use super::traits::ProcessControl;
use crate::core::types::{OperationKind, Pid, ProcessState, ResumePoint};
use crate::ipc::{KernelEndpoint, SyscallContext};
use std::fmt;
use std::sync::Arc;

/// Kernel's control record for one application slot
pub struct ProcessRecord {
    control: Arc<dyn ProcessControl>,
    channel: KernelEndpoint,
    state: ProcessState,
    io_pending: bool,
    saved_resume_point: Option<ResumePoint>,
    pending_operation: Option<OperationKind>,
}

impl ProcessRecord {
    /// Fresh record: READY, no I/O, no saved context
    pub fn new(control: Arc<dyn ProcessControl>, channel: KernelEndpoint) -> Self {
        Self {
            control,
            channel,
            state: ProcessState::Ready,
            io_pending: false,
            saved_resume_point: None,
            pending_operation: None,
        }
    }

    pub fn pid(&self) -> Pid {
        self.control.pid()
    }

    pub fn control(&self) -> &dyn ProcessControl {
        self.control.as_ref()
    }

    pub fn channel(&self) -> &KernelEndpoint {
        &self.channel
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn io_pending(&self) -> bool {
        self.io_pending
    }

    pub fn saved_resume_point(&self) -> Option<ResumePoint> {
        self.saved_resume_point
    }

    pub fn pending_operation(&self) -> Option<OperationKind> {
        self.pending_operation
    }

    pub(crate) fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    pub(crate) fn set_io_pending(&mut self, pending: bool) {
        self.io_pending = pending;
    }

    pub(crate) fn save_context(&mut self, ctx: SyscallContext) {
        self.saved_resume_point = Some(ctx.resume_point);
        self.pending_operation = Some(ctx.operation);
    }

    /// Clear the saved resume point, returning it
    pub(crate) fn take_resume_point(&mut self) -> Option<ResumePoint> {
        self.saved_resume_point.take()
    }
}

impl fmt::Debug for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRecord")
            .field("pid", &self.pid())
            .field("state", &self.state)
            .field("io_pending", &self.io_pending)
            .field("saved_resume_point", &self.saved_resume_point)
            .field("pending_operation", &self.pending_operation)
            .finish()
    }
}
