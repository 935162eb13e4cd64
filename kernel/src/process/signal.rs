/*!
 * Run Signal
 *
 * Suspend/resume delivered to an application task through a watch channel.
 * The application side ([`RunGate`]) parks at instruction boundaries while
 * the kernel side ([`RunSignal`]) holds it stopped.
 */

use super::traits::ProcessControl;
use crate::core::types::Pid;
use tokio::sync::watch;

/// Observable run state of one application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub running: bool,
    /// Number of resumes issued so far
    pub resumes: u64,
}

/// Kernel-held half
#[derive(Debug)]
pub struct RunSignal {
    pid: Pid,
    tx: watch::Sender<RunState>,
}

/// Application-held half
#[derive(Debug, Clone)]
pub struct RunGate {
    rx: watch::Receiver<RunState>,
}

/// Gate closed because the kernel dropped its signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("run signal dropped")]
pub struct GateClosed;

/// Create a suspended signal/gate pair
pub fn run_signal(pid: Pid) -> (RunSignal, RunGate) {
    let (tx, rx) = watch::channel(RunState::default());
    (RunSignal { pid, tx }, RunGate { rx })
}

impl RunSignal {
    pub fn state(&self) -> RunState {
        *self.tx.borrow()
    }
}

impl ProcessControl for RunSignal {
    fn pid(&self) -> Pid {
        self.pid
    }

    // send_modify succeeds with no receivers, so a finished application
    // turns suspend/resume into no-ops.
    fn suspend(&self) {
        self.tx.send_modify(|s| s.running = false);
    }

    fn resume(&self) {
        self.tx.send_modify(|s| {
            s.running = true;
            s.resumes += 1;
        });
    }
}

impl RunGate {
    pub fn state(&self) -> RunState {
        *self.rx.borrow()
    }

    /// Wait until the kernel lets this unit run
    pub async fn wait_running(&mut self) -> Result<RunState, GateClosed> {
        self.rx
            .wait_for(|s| s.running)
            .await
            .map(|s| *s)
            .map_err(|_| GateClosed)
    }

    /// Wait for a resume newer than `seen` resumes
    pub async fn wait_resumed_after(&mut self, seen: u64) -> Result<RunState, GateClosed> {
        self.rx
            .wait_for(|s| s.running && s.resumes > seen)
            .await
            .map(|s| *s)
            .map_err(|_| GateClosed)
    }
}
