use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hostwatch::core::scheduler::Scheduler;
use hostwatch::core::system_monitor::Thresholds;

use super::common::*;

#[test]
fn test_run_once_runs_a_single_cycle() {
    let fixture = Fixture::new();
    fixture.append_log("ERROR once\n");
    let transport = RecordingTransport::default();
    let mut scheduler = Scheduler::new(fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 5.0, 5.0),
        }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    ));

    let report = scheduler.run_once().unwrap();

    assert_eq!(report.finding.total(), 1);
    assert_eq!(transport.count(), 1);
    assert_eq!(fixture.store().load().log_offset, 11);
}

#[test]
fn test_loop_stops_on_shutdown_between_cycles() {
    let fixture = Fixture::new();
    fixture.append_log("");
    let mut scheduler = Scheduler::new(fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 5.0, 5.0),
        }),
        Arc::new(RecordingTransport::default()),
        Thresholds::default(),
        &["error"],
    ));

    let signal = scheduler.shutdown_signal();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        signal.trigger();
    });

    let started = Instant::now();
    let cycles = scheduler.run_loop(Duration::from_secs(30));

    assert_eq!(cycles, 1, "the wait should be cut short by the signal");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(fixture.store().load().last_sample.is_some());
    stopper.join().unwrap();
}

#[test]
fn test_loop_keeps_going_after_failed_cycles() {
    let fixture = Fixture::new();
    let mut scheduler = Scheduler::new(fixture.cycle(
        Box::new(BrokenSource),
        Arc::new(RecordingTransport::default()),
        Thresholds::default(),
        &["error"],
    ));

    let signal = scheduler.shutdown_signal();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        signal.trigger();
    });

    let cycles = scheduler.run_loop(Duration::from_millis(10));

    assert!(cycles >= 2, "expected repeated attempts, got {}", cycles);
    stopper.join().unwrap();
}

#[test]
fn test_loop_does_not_start_when_already_stopped() {
    let fixture = Fixture::new();
    let transport = RecordingTransport::default();
    let mut scheduler = Scheduler::new(fixture.cycle(
        Box::new(FixedSource {
            sample: sample(99.0, 5.0, 5.0),
        }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    ));

    scheduler.shutdown_signal().trigger();

    assert_eq!(scheduler.run_loop(Duration::from_millis(10)), 0);
    assert_eq!(transport.count(), 0);
    assert!(!fixture.state.exists());
}

#[test]
fn test_loop_with_maximal_interval_stops_on_signal() {
    let fixture = Fixture::new();
    fixture.append_log("");
    let mut scheduler = Scheduler::new(fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 5.0, 5.0),
        }),
        Arc::new(RecordingTransport::default()),
        Thresholds::default(),
        &["error"],
    ));

    let signal = scheduler.shutdown_signal();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        signal.trigger();
    });

    let cycles = scheduler.run_loop(Duration::from_secs(u64::MAX));

    assert_eq!(cycles, 1);
    stopper.join().unwrap();
}
