/*!
 * Lock-Free Kernel Statistics
 * Atomic counters updated from the dispatcher, readable from any task
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of [`KernelStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelStatsSnapshot {
    pub dispatches: u64,
    pub preemptions: u64,
    pub idle_schedules: u64,
    pub syscalls: u64,
    pub io_started: u64,
    pub io_completed: u64,
    pub resume_points_delivered: u64,
    pub protocol_violations: u64,
}

/// Atomic kernel statistics
///
/// All operations use relaxed ordering; the snapshot is not a consistent cut
/// across counters, which is fine for reporting.
#[derive(Debug, Default)]
pub struct KernelStats {
    dispatches: AtomicU64,
    preemptions: AtomicU64,
    idle_schedules: AtomicU64,
    syscalls: AtomicU64,
    io_started: AtomicU64,
    io_completed: AtomicU64,
    resume_points_delivered: AtomicU64,
    protocol_violations: AtomicU64,
}

impl KernelStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_dispatches(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_preemptions(&self) {
        self.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_idle_schedules(&self) {
        self.idle_schedules.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_syscalls(&self) {
        self.syscalls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_io_started(&self) {
        self.io_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_io_completed(&self) {
        self.io_completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_resume_points_delivered(&self) {
        self.resume_points_delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_protocol_violations(&self) {
        self.protocol_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> KernelStatsSnapshot {
        KernelStatsSnapshot {
            dispatches: self.dispatches.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            idle_schedules: self.idle_schedules.load(Ordering::Relaxed),
            syscalls: self.syscalls.load(Ordering::Relaxed),
            io_started: self.io_started.load(Ordering::Relaxed),
            io_completed: self.io_completed.load(Ordering::Relaxed),
            resume_points_delivered: self.resume_points_delivered.load(Ordering::Relaxed),
            protocol_violations: self.protocol_violations.load(Ordering::Relaxed),
        }
    }
}
