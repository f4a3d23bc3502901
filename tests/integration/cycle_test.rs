use std::fs;
use std::sync::Arc;

use hostwatch::core::cycle::{CyclePhase, DispatchOutcome};
use hostwatch::core::state::RunState;
use hostwatch::core::system_monitor::{Metric, Thresholds};
use hostwatch::MonitorError;

use super::common::*;

fn cpu_only(limit: f64) -> Thresholds {
    Thresholds {
        cpu_percent: Some(limit),
        ..Default::default()
    }
}

#[test]
fn test_cpu_breach_dispatches_once() {
    let fixture = Fixture::new();
    fixture.append_log("");
    let transport = RecordingTransport::default();
    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(95.0, 10.0, 10.0),
        }),
        Arc::new(transport.clone()),
        cpu_only(90.0),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert_eq!(report.breaches.len(), 1);
    assert_eq!(report.breaches[0].metric, Metric::Cpu);
    assert!(report.breaches[0].to_string().contains("cpu_percent"));
    assert_eq!(report.dispatch, DispatchOutcome::Sent);
    assert_eq!(transport.count(), 1);

    let sent = transport.sent.lock();
    assert_eq!(sent[0].0, "ALERT: test host");
    assert!(sent[0].1.contains("CPU usage high: 95.0%"));
}

#[test]
fn test_quiet_cycle_skips_dispatch_and_saves_state() {
    let fixture = Fixture::new();
    fixture.append_log("");
    let transport = RecordingTransport::default();
    let quiet = sample(5.0, 10.0, 10.0);
    let mut cycle = fixture.cycle(
        Box::new(FixedSource { sample: quiet }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert_eq!(report.dispatch, DispatchOutcome::Skipped);
    assert_eq!(transport.count(), 0);
    assert!(!report.phases.contains(&CyclePhase::ComposingAlert));
    assert!(!report.phases.contains(&CyclePhase::Dispatching));
    assert!(report.phases.contains(&CyclePhase::PersistingState));

    let state = fixture.store().load();
    assert_eq!(state.log_offset, 0);
    assert_eq!(state.last_sample, Some(quiet));
}

#[test]
fn test_log_match_dispatches_and_advances_offset() {
    let fixture = Fixture::new();
    fixture.append_log("ok\nERROR disk failure\nok\n");
    let transport = RecordingTransport::default();
    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 10.0, 10.0),
        }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    let lines: Vec<_> = report.finding.lines().collect();
    assert_eq!(lines, vec!["ERROR disk failure"]);
    assert_eq!(report.lines_read, 3);
    assert_eq!(transport.count(), 1);

    let file_len = fs::metadata(&fixture.log).unwrap().len();
    assert_eq!(report.offset_after, file_len);
    assert_eq!(fixture.store().load().log_offset, file_len);
}

#[test]
fn test_failed_dispatch_still_persists_offset() {
    let fixture = Fixture::new();
    fixture.append_log("ok\nERROR disk failure\nok\n");
    let transport = FailingTransport::default();
    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 10.0, 10.0),
        }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert!(matches!(report.dispatch, DispatchOutcome::Failed(_)));
    assert_eq!(*transport.attempts.lock(), 1);
    assert_eq!(
        report.phases.last(),
        Some(&CyclePhase::Idle),
        "cycle should run to completion"
    );

    let file_len = fs::metadata(&fixture.log).unwrap().len();
    assert_eq!(fixture.store().load().log_offset, file_len);
}

#[test]
fn test_restart_does_not_realert_on_seen_lines() {
    let fixture = Fixture::new();
    fixture.append_log("kernel: critical failure\n");
    let transport = RecordingTransport::default();

    for _ in 0..2 {
        // A fresh cycle per run simulates a process restart
        let mut cycle = fixture.cycle(
            Box::new(FixedSource {
                sample: sample(5.0, 10.0, 10.0),
            }),
            Arc::new(transport.clone()),
            Thresholds::default(),
            &["critical"],
        );
        cycle.run().unwrap();
    }

    assert_eq!(transport.count(), 1);

    fixture.append_log("sshd: unauthorized login\nkernel: critical again\n");
    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 10.0, 10.0),
        }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["critical"],
    );
    let report = cycle.run().unwrap();

    let lines: Vec<_> = report.finding.lines().collect();
    assert_eq!(lines, vec!["kernel: critical again"]);
    assert_eq!(transport.count(), 2);
}

#[test]
fn test_rotated_log_is_rescanned_from_start() {
    let fixture = Fixture::new();
    fixture.append_log("new file\nERROR after rotation\n");
    fixture
        .store()
        .save(&RunState {
            log_offset: 10_000,
            last_sample: None,
        })
        .unwrap();

    let transport = RecordingTransport::default();
    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 10.0, 10.0),
        }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert_eq!(report.offset_before, 10_000);
    assert_eq!(report.finding.total(), 1);
    assert_eq!(
        fixture.store().load().log_offset,
        fs::metadata(&fixture.log).unwrap().len()
    );
}

#[test]
fn test_missing_log_resets_offset() {
    let fixture = Fixture::new();
    fixture
        .store()
        .save(&RunState {
            log_offset: 500,
            last_sample: None,
        })
        .unwrap();

    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 10.0, 10.0),
        }),
        Arc::new(RecordingTransport::default()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert!(report.log_missing);
    assert_eq!(fixture.store().load().log_offset, 0);
}

#[test]
fn test_unreadable_log_keeps_offset() {
    let fixture = Fixture::new();
    // A directory in place of the log file cannot be read
    fs::create_dir(&fixture.log).unwrap();
    fixture
        .store()
        .save(&RunState {
            log_offset: 42,
            last_sample: None,
        })
        .unwrap();

    let transport = RecordingTransport::default();
    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 10.0, 10.0),
        }),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert!(report.finding.is_empty());
    assert_eq!(transport.count(), 0);
    assert_eq!(fixture.store().load().log_offset, 42);
}

#[test]
fn test_collection_error_persists_nothing() {
    let fixture = Fixture::new();
    fixture.append_log("ERROR something\n");
    let transport = RecordingTransport::default();
    let mut cycle = fixture.cycle(
        Box::new(BrokenSource),
        Arc::new(transport.clone()),
        Thresholds::default(),
        &["error"],
    );

    let result = cycle.run();

    assert!(matches!(result, Err(MonitorError::Collection(_))));
    assert_eq!(transport.count(), 0);
    assert!(!fixture.state.exists());
}

#[test]
fn test_corrupt_state_is_replaced() {
    let fixture = Fixture::new();
    fixture.append_log("fine\n");
    fs::write(&fixture.state, "not json at all").unwrap();

    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(5.0, 10.0, 10.0),
        }),
        Arc::new(RecordingTransport::default()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert_eq!(report.offset_before, 0);
    assert_eq!(fixture.store().load().log_offset, 5);
}

#[test]
fn test_phase_order_with_alert() {
    let fixture = Fixture::new();
    fixture.append_log("");
    let mut cycle = fixture.cycle(
        Box::new(FixedSource {
            sample: sample(99.0, 10.0, 10.0),
        }),
        Arc::new(RecordingTransport::default()),
        Thresholds::default(),
        &["error"],
    );

    let report = cycle.run().unwrap();

    assert_eq!(
        report.phases,
        vec![
            CyclePhase::Idle,
            CyclePhase::CollectingMetrics,
            CyclePhase::EvaluatingThresholds,
            CyclePhase::TailingLog,
            CyclePhase::ScanningPatterns,
            CyclePhase::ComposingAlert,
            CyclePhase::Dispatching,
            CyclePhase::PersistingState,
            CyclePhase::Idle,
        ]
    );
}
