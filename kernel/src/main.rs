/*!
 * Round-Robin I/O Kernel - Main Entry Point
 *
 * Boots a simulated kernel that multiplexes one logical CPU across
 * N application processes:
 * - Round-robin preemption on every timer tick
 * - Blocking I/O syscalls serviced in FIFO order
 * - Resume-point restore after each blocking call
 *
 * Usage: kernel <num_apps>   (3..=6)
 */

use miette::IntoDiagnostic;
use rr_io_kernel::sim::Simulation;
use rr_io_kernel::{init_tracing, KernelConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Configuration errors are fatal before any kernel state exists
    let config = KernelConfig::from_env()?;

    init_tracing();

    info!("Kernel starting...");
    info!("================================================");
    info!(
        num_apps = config.num_apps,
        time_slice = ?config.time_slice,
        io_duration = ?config.io_duration,
        resume_policy = config.resume_policy.as_str(),
        "Kernel configuration loaded"
    );

    let mut simulation = Simulation::start(&config);

    info!("Kernel is running - press Ctrl+C to exit");

    tokio::select! {
        result = simulation.join_applications() => {
            result?;
            info!("All applications finished");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.into_diagnostic()?;
            warn!("Interrupted, shutting down");
        }
    }

    let report = simulation.shutdown().await?;

    info!("================================================");
    match serde_json::to_string(&report.stats) {
        Ok(json) => info!(stats = %json, "Kernel statistics"),
        Err(e) => warn!(error = %e, "Could not serialize kernel statistics"),
    }
    for app in &report.applications {
        info!(
            index = app.index,
            pid = app.pid,
            instructions = app.instructions_executed,
            syscalls = app.syscalls.len(),
            completed = app.completed,
            "App A{} summary",
            app.index
        );
    }

    Ok(())
}
