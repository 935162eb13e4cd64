/*!
 * Interrupts Module
 * Event types, the dispatcher and the kernel event loop
 */

pub mod controller;
pub mod dispatcher;
pub mod task;
pub mod types;

// Re-export for convenience
pub use controller::{ChannelIoController, IoController};
pub use dispatcher::Dispatcher;
pub use task::{KernelCommand, KernelTask};
pub use types::{event_queue, EventReceiver, EventSender, InterruptEvent, IoRequest};
