/*!
 * System Limits and Constants
 *
 * Centralized location for the simulation's bounds and timing defaults.
 */

use std::time::Duration;

// =============================================================================
// PROCESS TABLE
// =============================================================================

/// Smallest process table accepted at startup
pub const MIN_APPS: usize = 3;

/// Largest process table accepted at startup
pub const MAX_APPS: usize = 6;

// =============================================================================
// TIMING
// =============================================================================

/// Period of the timer tick (one scheduling quantum)
pub const DEFAULT_TIME_SLICE: Duration = Duration::from_secs(1);

/// Service time of one blocking I/O operation (three quanta)
pub const DEFAULT_IO_DURATION: Duration = Duration::from_secs(3);

/// Wall time of one application instruction
pub const DEFAULT_INSTRUCTION_TIME: Duration = Duration::from_secs(1);

// =============================================================================
// APPLICATION PROGRAM
// =============================================================================

/// Instructions each application executes before finishing
pub const DEFAULT_MAX_ITERATIONS: u32 = 30;

/// Program counters at which an application issues a READ syscall
pub const READ_SYSCALL_POINTS: [u32; 2] = [5, 15];

/// Program counters at which an application issues a WRITE syscall
pub const WRITE_SYSCALL_POINTS: [u32; 2] = [10, 20];

// =============================================================================
// ENVIRONMENT
// =============================================================================

pub const ENV_TIME_SLICE_MS: &str = "KERNEL_TIME_SLICE_MS";
pub const ENV_IO_DURATION_MS: &str = "KERNEL_IO_DURATION_MS";
pub const ENV_INSTRUCTION_MS: &str = "KERNEL_INSTRUCTION_MS";
pub const ENV_MAX_ITERATIONS: &str = "KERNEL_MAX_ITERATIONS";
pub const ENV_RESUME_POLICY: &str = "KERNEL_RESUME_POLICY";
pub const ENV_TRACE_JSON: &str = "KERNEL_TRACE_JSON";

// =============================================================================
// IDENTITY
// =============================================================================

/// Simulated PID of process slot 0; slot `i` gets `BASE_PID + i`
pub const BASE_PID: u32 = 1000;
