//! Threshold evaluation.
//!
//! Compares a metrics sample against configured limits and reports breaches.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::{Metric, MetricsSample};

/// Limit applied to any metric without an explicit threshold (%)
pub const DEFAULT_LIMIT: f64 = 90.0;

/// Per-metric limits; unset metrics fall back to [`DEFAULT_LIMIT`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<f64>,
}

impl Thresholds {
    pub fn limit(&self, metric: Metric) -> f64 {
        let configured = match metric {
            Metric::Cpu => self.cpu_percent,
            Metric::Memory => self.mem_percent,
            Metric::Disk => self.disk_percent,
        };
        configured.unwrap_or(DEFAULT_LIMIT)
    }

    /// Explicitly configured limits, by config key
    pub fn configured(&self) -> Vec<(&'static str, f64)> {
        Metric::ALL
            .iter()
            .filter_map(|m| {
                let value = match m {
                    Metric::Cpu => self.cpu_percent,
                    Metric::Memory => self.mem_percent,
                    Metric::Disk => self.disk_percent,
                }?;
                Some((m.key(), value))
            })
            .collect()
    }
}

/// A metric at or above its limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breach {
    pub metric: Metric,
    pub value: f64,
    pub limit: f64,
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} usage high: {:.1}% ({} >= {:.1})",
            self.metric.label(),
            self.value,
            self.metric.key(),
            self.limit
        )
    }
}

/// Evaluate a sample against thresholds, in cpu, memory, disk order.
///
/// Equality counts as a breach.
pub fn evaluate(sample: &MetricsSample, thresholds: &Thresholds) -> Vec<Breach> {
    Metric::ALL
        .iter()
        .filter_map(|&metric| {
            let value = metric.value_in(sample);
            let limit = thresholds.limit(metric);
            (value >= limit).then_some(Breach {
                metric,
                value,
                limit,
            })
        })
        .collect()
}
