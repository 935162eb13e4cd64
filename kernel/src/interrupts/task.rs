/*!
 * Kernel Task
 *
 * Single consumer of the kernel event queue. Producers (timer, controller,
 * applications) run as independent tasks and only ever send events; one
 * event is handled to completion before the next is taken.
 */

use super::dispatcher::Dispatcher;
use super::types::EventReceiver;
use crate::core::errors::KernelError;
use crate::core::types::KernelResult;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Control messages for the kernel task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelCommand {
    /// Stop handling events and hand the dispatcher back
    Shutdown,
}

/// Handle to the kernel background task
pub struct KernelTask {
    command_tx: mpsc::UnboundedSender<KernelCommand>,
    handle: Option<tokio::task::JoinHandle<Dispatcher>>,
}

impl KernelTask {
    /// Spawn the kernel loop. It makes the initial scheduling decision, then
    /// drains `events` in arrival order.
    pub fn spawn(dispatcher: Dispatcher, events: EventReceiver) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(run_kernel_loop(dispatcher, events, command_rx));
        info!("Kernel task spawned");

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    /// Stop the loop and return the dispatcher with its final state
    pub async fn shutdown(mut self) -> KernelResult<Dispatcher> {
        let _ = self.command_tx.send(KernelCommand::Shutdown);

        let handle = self
            .handle
            .take()
            .ok_or_else(|| KernelError::Task("kernel task already joined".into()))?;

        handle.await.map_err(|e| {
            warn!("Kernel task shutdown error: {}", e);
            KernelError::Task(e.to_string())
        })
    }
}

async fn run_kernel_loop(
    mut dispatcher: Dispatcher,
    mut events: EventReceiver,
    mut command_rx: mpsc::UnboundedReceiver<KernelCommand>,
) -> Dispatcher {
    info!("Starting scheduling...");
    dispatcher.schedule();

    loop {
        tokio::select! {
            biased;

            Some(cmd) = command_rx.recv() => match cmd {
                KernelCommand::Shutdown => {
                    info!("Kernel task shutting down");
                    break;
                }
            },

            event = events.recv() => match event {
                Some(event) => {
                    dispatcher.handle(event);
                }
                None => {
                    info!("All event producers closed, kernel task exiting");
                    break;
                }
            },
        }
    }

    dispatcher
}

impl Drop for KernelTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(KernelCommand::Shutdown);
        }
    }
}
