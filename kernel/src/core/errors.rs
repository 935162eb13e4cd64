/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use super::types::{ProcessIndex, ProcessState};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Startup configuration errors. Fatal: no kernel state is built.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Missing argument: {0}")]
    #[diagnostic(
        code(config::missing_argument),
        help("Usage: kernel <num_apps>, where num_apps is between 3 and 6.")
    )]
    MissingArgument(&'static str),

    #[error("num_apps must be between 3 and 6, got {0}")]
    #[diagnostic(
        code(config::invalid_process_count),
        help("Pass a process count between 3 and 6.")
    )]
    InvalidProcessCount(usize),

    #[error("Invalid number for {name}: {value:?}")]
    #[diagnostic(code(config::invalid_number))]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid duration for {name}: must be greater than zero")]
    #[diagnostic(
        code(config::invalid_duration),
        help("Durations are given in milliseconds and must be positive.")
    )]
    InvalidDuration { name: &'static str },

    #[error("Invalid resume policy {0:?}")]
    #[diagnostic(
        code(config::invalid_resume_policy),
        help("Valid: skip, reexecute")
    )]
    InvalidResumePolicy(String),
}

/// Violations of the kernel/application/controller protocol.
///
/// Recovered locally by the dispatcher: logged, counted, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProtocolViolation {
    #[error("Process {0} signalled a syscall without writing its context")]
    #[diagnostic(code(protocol::no_context))]
    NoContext(ProcessIndex),

    #[error("Process {index} sent a malformed syscall context: {reason}")]
    #[diagnostic(code(protocol::malformed_context))]
    MalformedContext { index: ProcessIndex, reason: String },

    #[error("Channel to process {0} is closed")]
    #[diagnostic(code(protocol::disconnected))]
    Disconnected(ProcessIndex),

    #[error("Process {index} requested a syscall while {state}")]
    #[diagnostic(code(protocol::unexpected_syscall))]
    UnexpectedSyscall {
        index: ProcessIndex,
        state: ProcessState,
    },

    #[error("Event names process {index}, but the table holds {len}")]
    #[diagnostic(code(protocol::unknown_process))]
    UnknownProcess { index: ProcessIndex, len: usize },

    #[error("I/O completion received with no operation in service")]
    #[diagnostic(code(protocol::spurious_io_complete))]
    SpuriousIoComplete,
}

/// Bugs in the dispatcher/scheduler itself. Unreachable in a correct kernel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Blocked queue overflow: capacity {capacity}, rejected process {index}")]
    QueueOverflow {
        capacity: usize,
        index: ProcessIndex,
    },

    #[error("Process index {index} out of bounds for table of {len}")]
    IndexOutOfBounds { index: ProcessIndex, len: usize },
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Protocol violation: {0}")]
    #[diagnostic(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error("Kernel invariant violated: {0}")]
    #[diagnostic(
        code(kernel::invariant),
        help("This is a kernel bug. Please report it with the trace log.")
    )]
    Invariant(#[from] InvariantViolation),

    #[error("Kernel task failed: {0}")]
    #[diagnostic(code(kernel::task_failed))]
    Task(String),
}
