//! One monitoring pass: collect, evaluate, tail, scan, alert, persist.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::alerting::{AlertDispatcher, LogNotifier, NotificationTransport, SmtpNotifier};
use crate::core::config::MonitorConfig;
use crate::core::log_watch::{LogFinding, LogTailer, PatternScanner};
use crate::core::state::{RunState, StateStore};
use crate::core::system_monitor::{
    evaluate, Breach, CollectorConfig, MetricsCollector, MetricsSample, MetricsSource, Thresholds,
};
use crate::error::{DispatchError, Result};

/// Steps of a cycle, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    CollectingMetrics,
    EvaluatingThresholds,
    TailingLog,
    ScanningPatterns,
    ComposingAlert,
    Dispatching,
    PersistingState,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::CollectingMetrics => "collecting metrics",
            CyclePhase::EvaluatingThresholds => "evaluating thresholds",
            CyclePhase::TailingLog => "tailing log",
            CyclePhase::ScanningPatterns => "scanning patterns",
            CyclePhase::ComposingAlert => "composing alert",
            CyclePhase::Dispatching => "dispatching",
            CyclePhase::PersistingState => "persisting state",
        };
        write!(f, "{}", name)
    }
}

/// What happened to this cycle's notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Skipped,
    Sent,
    Failed(DispatchError),
}

/// Summary of a completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub phases: Vec<CyclePhase>,
    pub sample: MetricsSample,
    pub breaches: Vec<Breach>,
    pub finding: LogFinding,
    pub lines_read: usize,
    pub offset_before: u64,
    pub offset_after: u64,
    pub log_missing: bool,
    pub dispatch: DispatchOutcome,
}

/// Cycle inputs that come straight from configuration
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub thresholds: Thresholds,
    pub log_file: PathBuf,
    pub alert_subject: String,
}

impl CycleSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            log_file: config.log_file.clone(),
            alert_subject: config.alert_subject.clone(),
        }
    }
}

/// Runs one collect → evaluate → tail → scan → alert → persist pass.
///
/// All collaborators are injected; the cycle owns no global state.
pub struct MonitorCycle {
    source: Box<dyn MetricsSource>,
    tailer: LogTailer,
    scanner: PatternScanner,
    store: StateStore,
    dispatcher: AlertDispatcher,
    settings: CycleSettings,
}

impl MonitorCycle {
    pub fn new(
        source: Box<dyn MetricsSource>,
        tailer: LogTailer,
        scanner: PatternScanner,
        store: StateStore,
        dispatcher: AlertDispatcher,
        settings: CycleSettings,
    ) -> Self {
        Self {
            source,
            tailer,
            scanner,
            store,
            dispatcher,
            settings,
        }
    }

    /// Wire up the real collector, files and transport described by `config`
    pub fn from_config(config: &MonitorConfig) -> Self {
        let collector = MetricsCollector::with_config(CollectorConfig {
            cpu_window: config.cpu_window(),
            disk_path: config.disk_path.clone(),
        });

        let transport = transport_for(config);

        Self::new(
            Box::new(collector),
            LogTailer::new(config.log_max_bytes),
            PatternScanner::new(config.patterns()),
            StateStore::new(config.state_path()),
            AlertDispatcher::new(transport, config.dispatch_timeout()),
            CycleSettings::from_config(config),
        )
    }

    /// Execute one cycle.
    ///
    /// Fails only if metrics cannot be collected (nothing is persisted) or the
    /// state file cannot be written. Log access and dispatch problems are
    /// logged and the cycle carries on to persist its state.
    pub fn run(&mut self) -> Result<CycleReport> {
        let mut phases = vec![CyclePhase::Idle];
        let state = self.store.load();

        enter(&mut phases, CyclePhase::CollectingMetrics);
        let sample = self.source.sample()?;
        log::info!("Snapshot: {}", sample);

        enter(&mut phases, CyclePhase::EvaluatingThresholds);
        let breaches = evaluate(&sample, &self.settings.thresholds);

        enter(&mut phases, CyclePhase::TailingLog);
        let log_file = &self.settings.log_file;
        let mut log_missing = false;
        let (lines, new_offset) = match self.tailer.read_new(log_file, state.log_offset) {
            Ok(read) => {
                if read.missing {
                    log_missing = true;
                    log::warn!("Log file {:?} not found; nothing scanned", log_file);
                } else if read.rotated {
                    log::warn!(
                        "Log file {:?} is smaller than saved offset {}; rescanning from the start",
                        log_file,
                        state.log_offset
                    );
                }
                log::info!("Read {} new log lines from {:?}", read.lines.len(), log_file);
                (read.lines, read.new_offset)
            }
            Err(e) => {
                log::warn!("{}; skipping log scan this cycle", e);
                (Vec::new(), state.log_offset)
            }
        };

        enter(&mut phases, CyclePhase::ScanningPatterns);
        let finding = self.scanner.scan(&lines);

        let dispatch = if breaches.is_empty() && finding.is_empty() {
            log::info!("No thresholds breached and no log hits.");
            DispatchOutcome::Skipped
        } else {
            enter(&mut phases, CyclePhase::ComposingAlert);
            match self.dispatcher.compose(
                &self.settings.alert_subject,
                &sample,
                &breaches,
                &finding,
            ) {
                Some(alert) => {
                    log::warn!("Alerts triggered: {:?}", alert.summary);
                    enter(&mut phases, CyclePhase::Dispatching);
                    match self.dispatcher.send(&alert) {
                        Ok(()) => {
                            log::info!("Alert sent to {}", alert.target);
                            DispatchOutcome::Sent
                        }
                        Err(e) => {
                            log::error!("Failed to send alert to {}: {}", alert.target, e);
                            DispatchOutcome::Failed(e)
                        }
                    }
                }
                None => DispatchOutcome::Skipped,
            }
        };

        enter(&mut phases, CyclePhase::PersistingState);
        self.store.save(&RunState {
            log_offset: new_offset,
            last_sample: Some(sample),
        })?;

        enter(&mut phases, CyclePhase::Idle);

        Ok(CycleReport {
            phases,
            sample,
            breaches,
            finding,
            lines_read: lines.len(),
            offset_before: state.log_offset,
            offset_after: new_offset,
            log_missing,
            dispatch,
        })
    }
}

/// SMTP when configured, otherwise alerts go to the operational log
fn transport_for(config: &MonitorConfig) -> Arc<dyn NotificationTransport> {
    match config.smtp {
        Some(ref smtp) => Arc::new(SmtpNotifier::new(smtp.clone(), config.dispatch_timeout())),
        None => Arc::new(LogNotifier),
    }
}

fn enter(phases: &mut Vec<CyclePhase>, phase: CyclePhase) {
    log::debug!("cycle: {}", phase);
    phases.push(phase);
}
