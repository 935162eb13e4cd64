/*!
 * Round-Robin I/O Kernel Library
 * Process scheduler and I/O-blocking subsystem of a simulated kernel
 */

pub mod core;
pub mod interrupts;
pub mod ipc;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod sim;

// Re-exports
pub use crate::core::{
    ConfigError, InvariantViolation, KernelConfig, KernelError, KernelResult, OperationKind, Pid,
    ProcessIndex, ProcessState, ProtocolViolation, ResumePoint, ResumePolicy,
};
pub use interrupts::{Dispatcher, InterruptEvent, IoController, KernelTask};
pub use ipc::{context_channel, KernelEndpoint, ProcessEndpoint, SyscallContext};
pub use monitoring::{init_tracing, KernelStats, KernelStatsSnapshot};
pub use process::{BlockedQueue, KernelState, ProcessControl, ProcessRecord, ProcessTable};
pub use scheduler::{RoundRobin, ScheduleOutcome};
