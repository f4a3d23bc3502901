// Shared fixtures for integration tests

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hostwatch::core::alerting::{AlertDispatcher, NotificationTransport};
use hostwatch::core::cycle::{CycleSettings, MonitorCycle};
use hostwatch::core::log_watch::{LogTailer, PatternScanner};
use hostwatch::core::state::StateStore;
use hostwatch::core::system_monitor::{MetricsSample, MetricsSource, Thresholds};
use hostwatch::{DispatchError, MonitorError};
use parking_lot::Mutex;
use tempfile::TempDir;

/// Metrics source returning a fixed sample
pub struct FixedSource {
    pub sample: MetricsSample,
}

impl MetricsSource for FixedSource {
    fn sample(&mut self) -> hostwatch::Result<MetricsSample> {
        Ok(self.sample)
    }
}

/// Metrics source that always fails
pub struct BrokenSource;

impl MetricsSource for BrokenSource {
    fn sample(&mut self) -> hostwatch::Result<MetricsSample> {
        Err(MonitorError::collection("permission denied"))
    }
}

/// Transport that records what it was asked to send
#[derive(Default, Clone)]
pub struct RecordingTransport {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingTransport {
    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl NotificationTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    fn target(&self) -> String {
        "ops@example.com".to_string()
    }

    fn send(&self, subject: &str, body: &str) -> Result<(), DispatchError> {
        self.sent.lock().push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Transport that always fails, counting attempts
#[derive(Default, Clone)]
pub struct FailingTransport {
    pub attempts: Arc<Mutex<usize>>,
}

impl NotificationTransport for FailingTransport {
    fn name(&self) -> &str {
        "failing"
    }

    fn target(&self) -> String {
        "ops@example.com".to_string()
    }

    fn send(&self, _subject: &str, _body: &str) -> Result<(), DispatchError> {
        *self.attempts.lock() += 1;
        Err(DispatchError::transport("connection refused"))
    }
}

pub fn sample(cpu: f64, mem: f64, disk: f64) -> MetricsSample {
    MetricsSample {
        timestamp: 1_700_000_000,
        cpu_percent: cpu,
        mem_percent: mem,
        disk_percent: disk,
        net_bytes_sent: 10_000,
        net_bytes_recv: 20_000,
    }
}

/// Temporary directory holding a log file and a state file
pub struct Fixture {
    pub dir: TempDir,
    pub log: PathBuf,
    pub state: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("syslog");
        let state = dir.path().join("state.json");
        Self { dir, log, state }
    }

    pub fn append_log(&self, text: &str) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(&self.state)
    }

    pub fn cycle(
        &self,
        source: Box<dyn MetricsSource>,
        transport: Arc<dyn NotificationTransport>,
        thresholds: Thresholds,
        patterns: &[&str],
    ) -> MonitorCycle {
        MonitorCycle::new(
            source,
            LogTailer::default(),
            PatternScanner::new(patterns.iter().copied()),
            self.store(),
            AlertDispatcher::new(transport, Duration::from_secs(2)),
            CycleSettings {
                thresholds,
                log_file: self.log.clone(),
                alert_subject: "ALERT: test host".to_string(),
            },
        )
    }
}
