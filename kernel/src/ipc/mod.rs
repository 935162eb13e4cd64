/*!
 * IPC Module
 * Context channel protocol between the kernel and its applications
 */

pub mod channel;
pub mod context;

// Re-export for convenience
pub use channel::{context_channel, ChannelError, KernelEndpoint, ProcessEndpoint};
pub use context::{CodecError, Frame, SyscallContext};
