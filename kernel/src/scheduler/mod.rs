/*!
 * Scheduler Module
 * Round-robin CPU selection with preemption and context restore
 */

mod round_robin;

pub use round_robin::{RoundRobin, ScheduleOutcome};
