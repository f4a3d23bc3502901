//! Host metrics.
//!
//! This module samples CPU, memory, disk and network usage and evaluates
//! the sample against configured thresholds.

mod collector;
mod metrics;
pub mod thresholds;

pub use collector::{CollectorConfig, MetricsCollector, MetricsSource};
pub use metrics::{Metric, MetricsSample};
pub use thresholds::{evaluate, Breach, Thresholds, DEFAULT_LIMIT};
