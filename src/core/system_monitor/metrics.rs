use humansize::{format_size, DECIMAL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One point-in-time reading of host resource usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSample {
    #[serde(default)]
    pub timestamp: i64, // Unix timestamp
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub disk_percent: f64,
    pub net_bytes_sent: u64, // since boot
    pub net_bytes_recv: u64, // since boot
}

/// Gauges that can be compared against a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
}

impl Metric {
    /// Evaluation order
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Memory, Metric::Disk];

    /// Name used in configuration and state files
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Cpu => "cpu_percent",
            Metric::Memory => "mem_percent",
            Metric::Disk => "disk_percent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU",
            Metric::Memory => "Memory",
            Metric::Disk => "Disk",
        }
    }

    pub fn value_in(&self, sample: &MetricsSample) -> f64 {
        match self {
            Metric::Cpu => sample.cpu_percent,
            Metric::Memory => sample.mem_percent,
            Metric::Disk => sample.disk_percent,
        }
    }
}

impl fmt::Display for MetricsSample {
    /// One-line summary written to the operational log and alert bodies.
    ///
    /// The `CPU: x% | MEM: y% | DISK: z%` prefix is parsed back by the dashboard history.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU: {:.1}% | MEM: {:.1}% | DISK: {:.1}% | NET_SENT: {} | NET_RECV: {}",
            self.cpu_percent,
            self.mem_percent,
            self.disk_percent,
            format_size(self.net_bytes_sent, DECIMAL),
            format_size(self.net_bytes_recv, DECIMAL),
        )
    }
}
