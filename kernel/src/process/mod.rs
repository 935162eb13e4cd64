/*!
 * Process Module
 * Process records, table, blocked queue and the control capability
 */

pub mod blocked_queue;
pub mod signal;
pub mod state;
pub mod table;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use blocked_queue::BlockedQueue;
pub use signal::{run_signal, GateClosed, RunGate, RunSignal, RunState};
pub use state::KernelState;
pub use table::ProcessTable;
pub use traits::ProcessControl;
pub use types::ProcessRecord;
