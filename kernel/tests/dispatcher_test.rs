/*!
 * Dispatcher Tests
 * Timer, syscall and I/O-completion handling end to end over fakes
 */

mod common;

use common::{dispatched, Action, ActionLog, Harness};
use mockall::{mock, predicate::eq, Sequence};
use pretty_assertions::assert_eq;
use rr_io_kernel::{
    InterruptEvent, IoController, OperationKind, ProcessIndex, ProcessState, ResumePolicy,
    ScheduleOutcome,
};
use std::sync::Arc;

use OperationKind::{Read, Write};
use ProcessState::{Blocked, Ready, Running};

mock! {
    pub Controller {}

    impl IoController for Controller {
        fn start_io(&self, index: ProcessIndex);
    }
}

#[test]
fn test_timer_ticks_cycle_through_every_process() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    assert_eq!(h.states(), vec![Running, Ready, Ready]);

    h.tick();
    assert_eq!(h.take_actions(), vec![Action::Suspend(0), Action::Resume(1)]);
    assert_eq!(h.states(), vec![Ready, Running, Ready]);

    h.tick();
    assert_eq!(h.take_actions(), vec![Action::Suspend(1), Action::Resume(2)]);

    h.tick();
    assert_eq!(h.take_actions(), vec![Action::Suspend(2), Action::Resume(0)]);
    assert_eq!(h.states(), vec![Running, Ready, Ready]);
}

#[test]
fn test_syscall_blocks_caller_and_starts_io() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);

    let outcome = h.syscall(0, 5, Read);

    assert_eq!(
        h.take_actions(),
        vec![Action::Suspend(0), Action::StartIo(0), Action::Resume(1)]
    );
    assert_eq!(dispatched(outcome), Some(1));
    assert_eq!(h.states(), vec![Blocked, Running, Ready]);

    let state = h.state();
    assert!(state.io_in_progress());
    assert_eq!(state.in_service(), Some(0));
    // Dequeued straight into service
    assert!(state.blocked_queue().is_empty());

    let record = state.table().get(0).unwrap();
    assert!(record.io_pending());
    assert_eq!(record.saved_resume_point(), Some(5));
    assert_eq!(record.pending_operation(), Some(Read));
}

#[test]
fn test_second_request_waits_for_controller() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    h.syscall(0, 5, Read);
    h.syscall(1, 10, Write);
    h.take_actions();

    assert_eq!(h.state().blocked_queue().to_vec(), vec![1]);
    assert_eq!(h.state().in_service(), Some(0));
    assert_eq!(h.states(), vec![Blocked, Blocked, Running]);

    h.io_complete();

    let state = h.state();
    assert_eq!(state.table().state(0).unwrap(), Ready);
    assert!(!state.table().get(0).unwrap().io_pending());
    assert!(state.io_in_progress());
    assert_eq!(state.in_service(), Some(1));
    assert!(state.blocked_queue().is_empty());
    // A0 is next in cyclic order after A2
    assert_eq!(
        h.take_actions(),
        vec![
            Action::StartIo(1),
            Action::Suspend(2),
            Action::Resume(0)
        ]
    );
}

#[test]
fn test_io_served_in_request_order() {
    let log: ActionLog = Arc::default();
    let mut controller = MockController::new();
    let mut seq = Sequence::new();
    for index in [2, 0, 1] {
        controller
            .expect_start_io()
            .with(eq(index))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
    }

    let mut h = Harness::with_controller(3, ResumePolicy::SkipSyscall, log, Arc::new(controller));
    h.dispatcher.schedule();

    // Requests arrive as [A2, A0, A1] with nothing in service
    h.syscall(2, 5, Read);
    h.syscall(0, 10, Write);
    h.syscall(1, 15, Read);
    assert_eq!(h.state().in_service(), Some(2));
    assert_eq!(h.state().blocked_queue().to_vec(), vec![0, 1]);

    let mut unblocked = Vec::new();
    for _ in 0..3 {
        let before = h.states();
        h.io_complete();
        let after = h.states();
        unblocked.extend(
            (0..3).filter(|&i| before[i] == Blocked && after[i] != Blocked),
        );
    }

    assert_eq!(unblocked, vec![2, 0, 1]);
    assert!(!h.state().io_in_progress());
}

#[test]
fn test_resume_point_skips_syscall_instruction() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    h.syscall(0, 5, Read);
    h.tick(); // A1 -> A2
    h.io_complete(); // A0 ready, next after A2 is A0

    assert_eq!(h.state().running(), Some(0));
    assert_eq!(h.apps[0].try_recv_resume_point(), Some(6));
    assert_eq!(h.state().table().get(0).unwrap().saved_resume_point(), None);

    // A later turn without a syscall delivers nothing
    for _ in 0..3 {
        h.tick();
    }
    assert_eq!(h.state().running(), Some(0));
    assert_eq!(h.apps[0].try_recv_resume_point(), None);
    assert_eq!(h.dispatcher.stats().snapshot().resume_points_delivered, 1);
}

#[test]
fn test_resume_point_reexecutes_syscall_instruction() {
    let mut h = Harness::booted(3, ResumePolicy::Reexecute);
    h.syscall(0, 5, Read);
    h.tick();
    let outcome = h.io_complete();

    assert_eq!(
        outcome,
        ScheduleOutcome::Dispatched {
            next: 0,
            preempted: Some(2),
            delivered: Some(5)
        }
    );
    assert_eq!(h.apps[0].try_recv_resume_point(), Some(5));
    assert_eq!(h.apps[0].try_recv_resume_point(), None);
}

#[test]
fn test_unblocked_process_waits_its_turn() {
    let mut h = Harness::booted(4, ResumePolicy::SkipSyscall);
    h.tick(); // A1 runs
    h.syscall(1, 5, Read); // A2 runs
    h.take_actions();

    h.io_complete();

    // A1 is READY but A3 comes first after A2
    assert_eq!(h.state().running(), Some(3));
    assert_eq!(dispatched(h.tick()), Some(0));
    assert_eq!(dispatched(h.tick()), Some(1));
    assert_eq!(h.apps[1].try_recv_resume_point(), Some(6));
}

#[test]
fn test_everyone_blocked_goes_idle() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    h.syscall(0, 5, Read);
    h.syscall(1, 5, Read);
    let outcome = h.syscall(2, 5, Read);
    h.take_actions();

    assert_eq!(outcome, ScheduleOutcome::Idle);
    assert_eq!(h.state().running(), None);
    assert_eq!(h.states(), vec![Blocked, Blocked, Blocked]);

    // Scheduling again is a no-op
    let queue = h.state().blocked_queue().to_vec();
    assert_eq!(h.dispatcher.schedule(), ScheduleOutcome::Idle);
    assert_eq!(h.tick(), ScheduleOutcome::Idle);
    assert!(h.take_actions().is_empty());
    assert_eq!(h.state().blocked_queue().to_vec(), queue);
    assert_eq!(h.states(), vec![Blocked, Blocked, Blocked]);

    // First completion brings the CPU back
    assert_eq!(dispatched(h.io_complete()), Some(0));
}

#[test]
fn test_missing_context_still_blocks() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);

    // Interrupt without writing a context first
    h.handle(InterruptEvent::SyscallRequest { index: 0 });

    assert_eq!(h.states(), vec![Blocked, Running, Ready]);
    assert_eq!(h.state().table().get(0).unwrap().saved_resume_point(), None);
    assert_eq!(h.dispatcher.stats().snapshot().protocol_violations, 1);

    h.tick();
    h.io_complete();
    assert_eq!(h.state().running(), Some(0));
    // Nothing to restore
    assert_eq!(h.apps[0].try_recv_resume_point(), None);
}

#[test]
fn test_malformed_context_is_not_captured() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    h.apps[0].send_frame(vec![0xff; 3]).unwrap();

    h.handle(InterruptEvent::SyscallRequest { index: 0 });

    let record = h.state().table().get(0).unwrap();
    assert_eq!(record.state(), Blocked);
    assert!(record.io_pending());
    assert_eq!(record.saved_resume_point(), None);
    assert_eq!(h.dispatcher.stats().snapshot().protocol_violations, 1);
}

#[test]
fn test_syscall_from_blocked_process_is_ignored() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    h.syscall(0, 5, Read);
    h.take_actions();

    h.syscall(0, 6, Write);

    // Only the closing scheduling decision acts
    assert_eq!(h.take_actions(), vec![Action::Suspend(1), Action::Resume(2)]);
    assert_eq!(h.state().in_service(), Some(0));
    assert!(h.state().blocked_queue().is_empty());
    assert_eq!(h.state().table().get(0).unwrap().saved_resume_point(), Some(5));
    assert_eq!(h.dispatcher.stats().snapshot().protocol_violations, 1);

    // The rejected request's context was consumed
    assert!(h.state().table().get(0).unwrap().channel().read_syscall_context().is_err());
}

#[test]
fn test_rejected_syscall_with_malformed_context_counts_both() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    h.syscall(0, 5, Read);
    h.apps[0].send_frame(vec![0xee; 5]).unwrap();

    h.handle(InterruptEvent::SyscallRequest { index: 0 });

    assert_eq!(h.dispatcher.stats().snapshot().protocol_violations, 2);
    assert_eq!(h.state().table().get(0).unwrap().saved_resume_point(), Some(5));
}

#[test]
fn test_syscall_for_unknown_process_is_tolerated() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);

    let outcome = h.handle(InterruptEvent::SyscallRequest { index: 6 });

    // Nothing blocked or queued; the tick-like reschedule still happens
    assert_eq!(dispatched(outcome), Some(1));
    assert_eq!(h.take_actions(), vec![Action::Suspend(0), Action::Resume(1)]);
    assert_eq!(h.states(), vec![Ready, Running, Ready]);
    assert!(h.state().blocked_queue().is_empty());
    assert!(!h.state().io_in_progress());

    let stats = h.dispatcher.stats().snapshot();
    assert_eq!(stats.protocol_violations, 1);
    assert_eq!(stats.io_started, 0);

    // Kernel keeps handling events afterwards
    assert_eq!(dispatched(h.tick()), Some(2));
}

#[test]
fn test_syscall_from_preempted_process_is_honoured() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    // A0 raised its syscall, but a queued tick moved the CPU first
    h.tick();
    h.take_actions();

    h.syscall(0, 5, Read);

    assert_eq!(
        h.take_actions(),
        vec![
            Action::Suspend(0),
            Action::StartIo(0),
            Action::Suspend(1),
            Action::Resume(2)
        ]
    );
    assert_eq!(h.states(), vec![Blocked, Ready, Running]);
    assert_eq!(h.state().in_service(), Some(0));
}

#[test]
fn test_spurious_io_complete_is_tolerated() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);

    let outcome = h.io_complete();

    // Still ends with a scheduling decision
    assert_eq!(dispatched(outcome), Some(1));
    assert!(!h.state().io_in_progress());
    assert_eq!(h.dispatcher.stats().snapshot().protocol_violations, 1);
}

#[test]
fn test_stats_track_io_lifecycle() {
    let mut h = Harness::booted(3, ResumePolicy::SkipSyscall);
    h.syscall(0, 5, Read);
    h.syscall(1, 10, Write);
    h.io_complete();
    h.io_complete();

    let stats = h.dispatcher.stats().snapshot();
    assert_eq!(stats.syscalls, 2);
    assert_eq!(stats.io_started, 2);
    assert_eq!(stats.io_completed, 2);
    assert_eq!(stats.protocol_violations, 0);
}
