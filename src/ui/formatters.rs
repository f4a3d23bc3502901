use chrono::{DateTime, Local, TimeZone};
use colored::*;
use humansize::{format_size as human_format_size, DECIMAL};

use crate::core::cycle::{CycleReport, DispatchOutcome};
use crate::core::system_monitor::{Metric, MetricsSample, Thresholds};

/// Format byte counts in human-readable decimal units (kB, MB, GB)
pub fn format_size(size: u64) -> String {
    human_format_size(size, DECIMAL)
}

/// Format a unix timestamp as local time (YYYY-MM-DD HH:MM:SS)
pub fn format_time(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(datetime) if timestamp > 0 => format_datetime(&datetime),
        _ => "unknown".to_string(),
    }
}

pub fn format_datetime(datetime: &DateTime<Local>) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Percentage colored against its limit: red at or over, yellow within 80% of it
pub fn format_percent(value: f64, limit: f64) -> ColoredString {
    let text = format!("{:5.1}%", value);
    if value >= limit {
        text.red().bold()
    } else if value >= limit * 0.8 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Multi-line summary of a sample with each gauge colored against its threshold
pub fn format_sample(sample: &MetricsSample, thresholds: &Thresholds) -> String {
    let mut out = Vec::new();

    for metric in Metric::ALL {
        out.push(format!(
            "  {:<8} {}  (limit {:.1}%)",
            metric.label(),
            format_percent(metric.value_in(sample), thresholds.limit(metric)),
            thresholds.limit(metric)
        ));
    }

    out.push(format!(
        "  {:<8} sent {} / received {}",
        "Network",
        format_size(sample.net_bytes_sent).cyan(),
        format_size(sample.net_bytes_recv).cyan()
    ));

    out.join("\n")
}

/// One-line result of a cycle for the terminal
pub fn format_report(report: &CycleReport) -> String {
    let status = match report.dispatch {
        DispatchOutcome::Skipped => "OK".green().bold(),
        DispatchOutcome::Sent => "ALERT SENT".yellow().bold(),
        DispatchOutcome::Failed(_) => "ALERT FAILED".red().bold(),
    };

    let mut line = format!(
        "{} {} | {} breach(es) | {} of {} new log line(s) matched | offset {} -> {}",
        status,
        report.sample,
        report.breaches.len(),
        report.finding.total(),
        report.lines_read,
        report.offset_before,
        report.offset_after
    );

    if let DispatchOutcome::Failed(ref e) = report.dispatch {
        line.push_str(&format!(" | {}", e.to_string().red()));
    }

    if report.log_missing {
        line.push_str(&format!(" | {}", "log file missing".yellow()));
    }

    line
}
