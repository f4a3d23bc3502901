//! Read-only view over the monitor's files, plus a manual trigger.
//!
//! The dashboard reads the operational log, the state file and the
//! configuration. It never writes the state file; the only way it affects
//! monitoring is by running a cycle in-process through [`Dashboard::trigger_run`].

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::core::config::MonitorConfig;
use crate::core::cycle::CycleReport;
use crate::core::scheduler::Scheduler;
use crate::core::state::{RunState, StateStore};

/// One metrics reading recovered from a `Snapshot:` line of the operational log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub disk_percent: f64,
}

pub struct Dashboard {
    config: MonitorConfig,
    ops_log: PathBuf,
    state: StateStore,
}

impl Dashboard {
    pub fn new(config: MonitorConfig) -> Self {
        let ops_log = config.ops_log_path();
        let state = StateStore::new(config.state_path());
        Self {
            config,
            ops_log,
            state,
        }
    }

    /// Last `n` lines of the operational log, oldest first
    pub fn tail_log(&self, n: usize) -> Result<Vec<String>> {
        let mut lines = self.read_ops_log()?;
        let skip = lines.len().saturating_sub(n);
        Ok(lines.split_off(skip))
    }

    /// Most recent `n` lines logged at WARNING or ERROR level, newest first.
    ///
    /// Alerts written by the log transport are WARNING lines and are included.
    pub fn warnings(&self, n: usize) -> Result<Vec<String>> {
        let level = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d+ (?:WARNING|ERROR): ")
            .context("Failed to create level regex")?;

        Ok(self
            .read_ops_log()?
            .into_iter()
            .rev()
            .filter(|line| level.is_match(line))
            .take(n)
            .collect())
    }

    pub fn state(&self) -> RunState {
        self.state.load()
    }

    /// Configuration as JSON, with secrets masked
    pub fn config_snapshot(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self.config.redacted()).context("Failed to serialize config")
    }

    /// Up to `max_points` most recent snapshots logged by past cycles
    pub fn history(&self, max_points: usize) -> Result<Vec<HistoryPoint>> {
        let pattern = Regex::new(
            r"^(?P<ts>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d+).*Snapshot: CPU: (?P<cpu>[\d.]+)% \| MEM: (?P<mem>[\d.]+)% \| DISK: (?P<disk>[\d.]+)%",
        )
        .context("Failed to create snapshot regex")?;

        let mut points: Vec<HistoryPoint> = self
            .read_ops_log()?
            .iter()
            .filter_map(|line| {
                let caps = pattern.captures(line)?;
                Some(HistoryPoint {
                    timestamp: caps["ts"].to_string(),
                    cpu_percent: caps["cpu"].parse().ok()?,
                    mem_percent: caps["mem"].parse().ok()?,
                    disk_percent: caps["disk"].parse().ok()?,
                })
            })
            .collect();

        let skip = points.len().saturating_sub(max_points);
        Ok(points.split_off(skip))
    }

    /// Run one monitor cycle in this process
    pub fn trigger_run(&self) -> crate::Result<CycleReport> {
        log::info!("Manual run requested from dashboard");
        Scheduler::from_config(&self.config).run_once()
    }

    fn read_ops_log(&self) -> Result<Vec<String>> {
        match fs::read(&self.ops_log) {
            Ok(data) => Ok(String::from_utf8_lossy(&data)
                .lines()
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", self.ops_log)),
        }
    }
}
