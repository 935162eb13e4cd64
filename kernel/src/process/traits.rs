/*!
 * Process Traits
 * Control capability the kernel holds over each application
 */

use crate::core::types::Pid;

/// Stop/continue capability over one application unit
///
/// The kernel never touches an application except through this handle and
/// the process's context channel. Tests substitute an in-memory recorder.
pub trait ProcessControl: Send + Sync {
    /// Identity used in logs
    fn pid(&self) -> Pid;

    /// Stop the unit at its next instruction boundary
    fn suspend(&self);

    /// Let the unit continue
    fn resume(&self);
}
