/*!
 * Shared test harness
 * In-memory process control and I/O controller that record every action
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use rr_io_kernel::interrupts::Dispatcher;
use rr_io_kernel::{
    context_channel, InterruptEvent, IoController, KernelState, OperationKind, Pid,
    ProcessControl, ProcessEndpoint, ProcessIndex, ProcessRecord, ProcessState, ResumePolicy,
    ScheduleOutcome, SyscallContext,
};
use std::sync::Arc;

/// Side effect the kernel performed on a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Suspend(ProcessIndex),
    Resume(ProcessIndex),
    StartIo(ProcessIndex),
}

pub type ActionLog = Arc<Mutex<Vec<Action>>>;

pub struct FakeProcess {
    index: ProcessIndex,
    log: ActionLog,
}

impl ProcessControl for FakeProcess {
    fn pid(&self) -> Pid {
        1000 + self.index as Pid
    }

    fn suspend(&self) {
        self.log.lock().push(Action::Suspend(self.index));
    }

    fn resume(&self) {
        self.log.lock().push(Action::Resume(self.index));
    }
}

pub struct FakeController {
    log: ActionLog,
}

impl IoController for FakeController {
    fn start_io(&self, index: ProcessIndex) {
        self.log.lock().push(Action::StartIo(index));
    }
}

/// Records plus the application-side endpoints that go with them
pub fn fake_records(n: usize, log: &ActionLog) -> (Vec<ProcessRecord>, Vec<ProcessEndpoint>) {
    (0..n)
        .map(|index| {
            let (kernel, process) = context_channel(index);
            let control = Arc::new(FakeProcess {
                index,
                log: Arc::clone(log),
            });
            (ProcessRecord::new(control, kernel), process)
        })
        .unzip()
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub apps: Vec<ProcessEndpoint>,
    log: ActionLog,
}

impl Harness {
    pub fn new(n: usize, policy: ResumePolicy) -> Self {
        let log: ActionLog = Arc::default();
        let controller = Arc::new(FakeController {
            log: Arc::clone(&log),
        });
        Self::with_controller(n, policy, log, controller)
    }

    pub fn with_controller(
        n: usize,
        policy: ResumePolicy,
        log: ActionLog,
        controller: Arc<dyn IoController>,
    ) -> Self {
        let (records, apps) = fake_records(n, &log);
        let dispatcher = Dispatcher::new(KernelState::new(records), controller, policy);
        Self {
            dispatcher,
            apps,
            log,
        }
    }

    /// Harness with the initial scheduling decision made and its actions cleared
    pub fn booted(n: usize, policy: ResumePolicy) -> Self {
        let mut harness = Self::new(n, policy);
        harness.dispatcher.schedule();
        harness.take_actions();
        harness
    }

    pub fn take_actions(&self) -> Vec<Action> {
        std::mem::take(&mut *self.log.lock())
    }

    pub fn state(&self) -> &KernelState {
        self.dispatcher.state()
    }

    pub fn states(&self) -> Vec<ProcessState> {
        self.state().table().iter().map(ProcessRecord::state).collect()
    }

    pub fn tick(&mut self) -> ScheduleOutcome {
        self.handle(InterruptEvent::TimerTick)
    }

    pub fn io_complete(&mut self) -> ScheduleOutcome {
        self.handle(InterruptEvent::IoComplete)
    }

    /// Write the context, then raise the syscall, as an application does
    pub fn syscall(&mut self, index: ProcessIndex, pc: u32, op: OperationKind) -> ScheduleOutcome {
        self.apps[index]
            .send_syscall_context(SyscallContext::new(pc, op))
            .unwrap();
        self.handle(InterruptEvent::SyscallRequest { index })
    }

    pub fn handle(&mut self, event: InterruptEvent) -> ScheduleOutcome {
        let outcome = self.dispatcher.handle(event);
        self.assert_invariants();
        outcome
    }

    pub fn assert_invariants(&self) {
        if let Err(broken) = self.state().check_invariants() {
            panic!("kernel invariant broken: {}", broken);
        }
    }
}

/// Index dispatched by an outcome, if any
pub fn dispatched(outcome: ScheduleOutcome) -> Option<ProcessIndex> {
    match outcome {
        ScheduleOutcome::Dispatched { next, .. } => Some(next),
        ScheduleOutcome::Idle => None,
    }
}
