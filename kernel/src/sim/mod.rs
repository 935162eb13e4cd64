/*!
 * Simulation
 * External collaborators of the kernel and the wiring that starts them
 */

pub mod application;
pub mod controller;

pub use application::{syscall_at, Application, ApplicationReport};
pub use controller::ControllerTask;

use crate::core::config::KernelConfig;
use crate::core::errors::KernelError;
use crate::core::limits::BASE_PID;
use crate::core::types::{KernelResult, Pid, ProcessState};
use crate::interrupts::{event_queue, ChannelIoController, Dispatcher, KernelTask};
use crate::ipc::context_channel;
use crate::monitoring::{KernelStats, KernelStatsSnapshot};
use crate::process::{run_signal, KernelState, ProcessRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Final view of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub applications: Vec<ApplicationReport>,
    pub stats: KernelStatsSnapshot,
    pub final_states: Vec<ProcessState>,
}

/// Running kernel, controller and applications
pub struct Simulation {
    kernel: KernelTask,
    controller: ControllerTask,
    stats: Arc<KernelStats>,
    applications: Vec<JoinHandle<ApplicationReport>>,
    finished: Vec<ApplicationReport>,
}

impl Simulation {
    /// Build every component and start them. Must run inside a tokio runtime.
    pub fn start(config: &KernelConfig) -> Self {
        info!(num_apps = config.num_apps, "Creating {} application processes...", config.num_apps);

        let (events_tx, events_rx) = event_queue();
        let mut records = Vec::with_capacity(config.num_apps);
        let mut applications = Vec::with_capacity(config.num_apps);

        for index in 0..config.num_apps {
            let pid = BASE_PID + index as Pid;
            let (signal, gate) = run_signal(pid);
            let (kernel_end, process_end) = context_channel(index);

            records.push(ProcessRecord::new(Arc::new(signal), kernel_end));

            let app = Application::new(index, pid, process_end, gate, events_tx.clone())
                .with_program(config.max_iterations, config.instruction_time);
            applications.push(tokio::spawn(app.run()));
            info!(index, pid, "Process A{} created (PID {})", index, pid);
        }

        let (io_controller, io_requests) = ChannelIoController::channel();
        let controller = ControllerTask::spawn(
            config.time_slice,
            config.io_duration,
            events_tx,
            io_requests,
        );

        let dispatcher = Dispatcher::new(
            KernelState::new(records),
            Arc::new(io_controller),
            config.resume_policy,
        );
        let stats = dispatcher.stats();
        let kernel = KernelTask::spawn(dispatcher, events_rx);

        Self {
            kernel,
            controller,
            stats,
            applications,
            finished: Vec::new(),
        }
    }

    pub fn stats(&self) -> KernelStatsSnapshot {
        self.stats.snapshot()
    }

    /// Applications that have not been joined yet
    pub fn pending_applications(&self) -> usize {
        self.applications.len()
    }

    /// Wait until every application has finished its program.
    ///
    /// Cancel safe: a handle leaves the pending set only once its task has
    /// completed, so `shutdown` can still abort the rest.
    pub async fn join_applications(&mut self) -> KernelResult<()> {
        while let Some(handle) = self.applications.first_mut() {
            let joined = handle.await;
            self.applications.remove(0);
            let report = joined.map_err(|e| KernelError::Task(e.to_string()))?;
            self.finished.push(report);
        }
        Ok(())
    }

    /// Stop the controller, then the kernel; abort unfinished applications
    pub async fn shutdown(self) -> KernelResult<SimulationReport> {
        let Self {
            kernel,
            controller,
            applications,
            mut finished,
            ..
        } = self;

        controller.shutdown().await;
        let dispatcher = kernel.shutdown().await?;

        if !applications.is_empty() {
            info!(count = applications.len(), "Aborting unfinished applications");
        }
        for handle in applications {
            handle.abort();
        }
        finished.sort_by_key(|r| r.index);

        let final_states = dispatcher
            .state()
            .table()
            .iter()
            .map(ProcessRecord::state)
            .collect();

        Ok(SimulationReport {
            applications: finished,
            stats: dispatcher.stats().snapshot(),
            final_states,
        })
    }
}
