/*!
 * Timer / I/O Controller
 *
 * Emits a timer tick every time slice and completes each I/O request after
 * the configured service time. Services one request at a time.
 */

use crate::core::types::ProcessIndex;
use crate::interrupts::{EventSender, InterruptEvent, IoRequest};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle to the controller background task
pub struct ControllerTask {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl ControllerTask {
    pub fn spawn(
        time_slice: Duration,
        io_duration: Duration,
        events: EventSender,
        requests: mpsc::UnboundedReceiver<IoRequest>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_controller_loop(
            time_slice,
            io_duration,
            events,
            requests,
            shutdown_rx,
        ));
        info!(?time_slice, ?io_duration, "Timer/I/O controller started");

        Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Controller task shutdown error: {}", e);
            }
        }
    }
}

impl Drop for ControllerTask {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn run_controller_loop(
    time_slice: Duration,
    io_duration: Duration,
    events: EventSender,
    mut requests: mpsc::UnboundedReceiver<IoRequest>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + time_slice, time_slice);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut in_flight: Option<(ProcessIndex, Instant)> = None;

    loop {
        let deadline = in_flight
            .map(|(_, at)| at)
            .unwrap_or_else(|| Instant::now() + io_duration);

        tokio::select! {
            biased;

            _ = &mut shutdown_rx => break,

            _ = tokio::time::sleep_until(deadline), if in_flight.is_some() => {
                if let Some((index, _)) = in_flight.take() {
                    debug!(index, "Device finished I/O");
                }
                if events.send(InterruptEvent::IoComplete).is_err() {
                    break;
                }
            }

            _ = ticker.tick() => {
                if events.send(InterruptEvent::TimerTick).is_err() {
                    break;
                }
            }

            request = requests.recv() => match request {
                Some(IoRequest { index }) => {
                    if let Some((busy, _)) = in_flight {
                        warn!(index, busy, "I/O start while device busy, ignored");
                    } else {
                        debug!(index, "Device servicing I/O");
                        in_flight = Some((index, Instant::now() + io_duration));
                    }
                }
                None => break,
            },
        }
    }

    info!("Timer/I/O controller stopped");
}
