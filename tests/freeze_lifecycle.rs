//! 冻结生命周期集成测试
//!
//! 使用模拟操作系统验证完整的发现、挂起、恢复流程

use gtappl::freeze::{self, FreezePlan};
use gtappl::platform::simulated::SimulatedOs;
use gtappl::{FreezeError, FreezeState, PauseOp, Pausable, ProcessNode, ProgramNode, Target};
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

fn foo_and_bar() -> Arc<SimulatedOs> {
    Arc::new(
        SimulatedOs::new()
            .with_process("Foo", 4100, &[10, 11])
            .with_process("Baz", 4200, &[50, 51])
            .with_process("Foo", 4300, &[20]),
    )
}

/// 两个 Foo 进程，线程 [10,11] 与 [20]
#[test]
fn test_end_to_end_foo() {
    let os = foo_and_bar();
    let program = ProgramNode::new("Foo", os.clone()).unwrap();

    let shape: Vec<(u32, Vec<u32>)> = program
        .processes()
        .iter()
        .map(|p| (p.id(), p.threads().iter().map(|t| t.id()).collect()))
        .collect();
    assert_eq!(shape, vec![(4100, vec![10, 11]), (4300, vec![20])]);

    assert!(program.suspend());
    assert_eq!(os.suspend_log(), vec![10, 11, 20]);
    for tid in [10, 11, 20] {
        assert_eq!(os.count_of(tid), 1);
    }

    assert!(program.resume());
    for tid in [10, 11, 20] {
        assert_eq!(os.count_of(tid), 0);
    }
    assert_eq!(os.count_of(50), 0);
    assert!(os.suspend_log().iter().all(|tid| ![50, 51].contains(tid)));
    assert_eq!(os.open_handles(), 0);
    assert_eq!(os.handles_opened(), os.handles_closed());
}

/// 没有 Bar 进程：节点为空，调用方必须视为启动失败
#[test]
fn test_fatal_empty_bar() {
    let os = foo_and_bar();

    let program = ProgramNode::new("Bar", os.clone()).unwrap();
    assert!(program.processes().is_empty());

    let err = Target::from_program(program).unwrap_err();
    assert!(matches!(err, FreezeError::NoMatchingProcess { .. }));
    assert!(os.suspend_log().is_empty());
}

#[test]
fn test_snapshot_survives_os_changes() {
    let os = foo_and_bar();
    let program = ProgramNode::new("Foo", os.clone()).unwrap();

    os.exit_thread(4100, 11);
    os.spawn("Foo", 4400, &[30]);

    assert_eq!(program.processes().len(), 2);
    assert_eq!(program.processes()[0].threads().len(), 2);
    assert_eq!(program.thread_count(), 3);

    // The exited thread can no longer be opened, so the walk stops there
    let report = program.sweep(PauseOp::Suspend);
    assert_eq!(report.failed_at, Some(0));
    assert_eq!(os.suspend_log(), vec![10]);
    assert_eq!(os.count_of(30), 0);
}

#[test]
fn test_repeated_suspend_fully_resumed() {
    let os = foo_and_bar();
    let process = ProcessNode::new(4300, os.clone()).unwrap();

    assert!(process.suspend());
    assert!(process.suspend());
    assert_eq!(os.count_of(20), 2);

    assert!(process.resume());
    assert_eq!(os.count_of(20), 0);
    assert_eq!(os.resume_calls(20), 2);

    // Already running: no further resume primitive
    assert!(process.resume());
    assert_eq!(os.resume_calls(20), 2);
}

#[test]
fn test_access_denied_is_reported_not_raised() {
    let os = foo_and_bar();
    os.refuse_open(20);
    let mut target = Target::attach("foo.exe", os.clone()).unwrap();

    assert!(!target.suspend());
    assert_eq!(target.state(), FreezeState::Scanned);
    // Threads of the first process were suspended before the failure
    assert_eq!(os.count_of(10), 1);
    assert_eq!(os.count_of(11), 1);

    assert!(!target.resume());
    assert_eq!(os.count_of(10), 0);
    assert_eq!(os.count_of(11), 0);
}

#[test]
fn test_freeze_session_round_trip() {
    let os = foo_and_bar();
    let mut target = Target::attach("Foo", os.clone()).unwrap();
    let interrupt = AtomicBool::new(false);
    let plan = FreezePlan {
        duration: Duration::from_millis(20),
        refresh: Duration::from_millis(5),
        lock_delay: Duration::from_millis(5),
    };

    let mut ticks = 0;
    let report = freeze::run(&mut target, &plan, &interrupt, |_| ticks += 1);

    assert!(report.succeeded());
    assert_eq!(report.processes, 2);
    assert_eq!(report.threads, 3);
    assert!(ticks >= 2);
    assert_eq!(target.state(), FreezeState::Resumed);
    for tid in [10, 11, 20] {
        assert_eq!(os.count_of(tid), 0);
    }
}
