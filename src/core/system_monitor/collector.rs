use std::path::{Path, PathBuf};
use std::time::Duration;

use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};

use crate::error::{MonitorError, Result};

use super::metrics::MetricsSample;

/// Anything that can produce a metrics sample for a monitor cycle
pub trait MetricsSource {
    fn sample(&mut self) -> Result<MetricsSample>;
}

/// Configuration for metrics collection
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Blocking window CPU usage is measured over
    pub cpu_window: Duration,
    /// Path whose filesystem is reported as `disk_percent`
    pub disk_path: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            cpu_window: Duration::from_secs(1),
            disk_path: PathBuf::from("/"),
        }
    }
}

/// Collects host metrics through `sysinfo`
pub struct MetricsCollector {
    system: System,
    disks: Disks,
    networks: Networks,
    config: CollectorConfig,
}

impl MetricsCollector {
    /// Create a new MetricsCollector with default configuration
    pub fn new() -> Self {
        Self::with_config(CollectorConfig::default())
    }

    /// Create a new MetricsCollector with custom configuration
    pub fn with_config(config: CollectorConfig) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        Self {
            system: System::new_with_specifics(refresh_kind),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            config,
        }
    }

    /// CPU usage over the configured window; blocks for that long.
    fn measure_cpu(&mut self) -> f64 {
        // A zero-length window yields a meaningless reading
        let window = self.config.cpu_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

        self.system.refresh_cpu_usage();
        std::thread::sleep(window);
        self.system.refresh_cpu_usage();

        self.system.global_cpu_usage() as f64
    }

    fn measure_memory(&mut self) -> Result<f64> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            return Err(MonitorError::collection("total memory reported as 0"));
        }

        Ok(percent(self.system.used_memory(), total))
    }

    fn measure_disk(&mut self) -> Result<f64> {
        self.disks.refresh(true);

        let mounts: Vec<(PathBuf, u64, u64)> = self
            .disks
            .iter()
            .map(|disk| {
                (
                    disk.mount_point().to_path_buf(),
                    disk.total_space(),
                    disk.available_space(),
                )
            })
            .collect();

        let (_, total, available) = best_mount(&mounts, &self.config.disk_path)
            .ok_or_else(|| {
                MonitorError::collection(format!(
                    "no mounted filesystem covers {:?}",
                    self.config.disk_path
                ))
            })?;

        Ok(percent(total.saturating_sub(*available), *total))
    }

    fn measure_network(&mut self) -> (u64, u64) {
        self.networks.refresh(true);

        self.networks.values().fold((0, 0), |(sent, recv), data| {
            (
                sent.saturating_add(data.total_transmitted()),
                recv.saturating_add(data.total_received()),
            )
        })
    }
}

impl MetricsSource for MetricsCollector {
    fn sample(&mut self) -> Result<MetricsSample> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(MonitorError::collection(
                "system metrics are not supported on this platform",
            ));
        }

        let cpu_percent = self.measure_cpu();
        let mem_percent = self.measure_memory()?;
        let disk_percent = self.measure_disk()?;
        let (net_bytes_sent, net_bytes_recv) = self.measure_network();

        Ok(MetricsSample {
            timestamp: chrono::Utc::now().timestamp(),
            cpu_percent,
            mem_percent,
            disk_percent,
            net_bytes_sent,
            net_bytes_recv,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Mount with the longest mount point that contains `path`
fn best_mount<'a>(
    mounts: &'a [(PathBuf, u64, u64)],
    path: &Path,
) -> Option<&'a (PathBuf, u64, u64)> {
    mounts
        .iter()
        .filter(|(mount_point, _, _)| path.starts_with(mount_point))
        .max_by_key(|(mount_point, _, _)| mount_point.components().count())
}
