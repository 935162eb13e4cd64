/*!
 * Interrupt Types
 * Events delivered to the kernel by the timer, controller and applications
 */

use crate::core::types::ProcessIndex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Asynchronous notification handled by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "irq", rename_all = "snake_case")]
pub enum InterruptEvent {
    /// IRQ0: end of the running process's quantum
    TimerTick,
    /// IRQ2: process `index` requests blocking I/O; its context is already
    /// on its channel
    SyscallRequest { index: ProcessIndex },
    /// IRQ1: the one in-flight I/O operation finished
    IoComplete,
}

impl InterruptEvent {
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TimerTick => "timer_tick",
            Self::SyscallRequest { .. } => "syscall_request",
            Self::IoComplete => "io_complete",
        }
    }
}

/// Producer side of the kernel's single event queue
pub type EventSender = mpsc::UnboundedSender<InterruptEvent>;

/// Consumer side of the kernel's single event queue
pub type EventReceiver = mpsc::UnboundedReceiver<InterruptEvent>;

/// Create the kernel event queue
pub fn event_queue() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Request sent to the I/O controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoRequest {
    pub index: ProcessIndex,
}
