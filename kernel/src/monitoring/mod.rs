/*!
 * Monitoring
 * Tracing setup and kernel counters
 */

mod stats;
mod tracer;

pub use stats::{KernelStats, KernelStatsSnapshot};
pub use tracer::init_tracing;
