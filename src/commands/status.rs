use anyhow::Result;
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::Metric;
use crate::core::{Dashboard, MonitorConfig};
use crate::ui::{format_percent, format_report, format_sample, format_time};

const HISTORY_POINTS: usize = 10;

/// Print the dashboard view: last sample, scan position, recent warnings and log tail
pub fn execute(config: &MonitorConfig, matches: &ArgMatches) -> Result<()> {
    let lines = matches.get_one::<usize>("lines").copied().unwrap_or(20);
    let dashboard = Dashboard::new(config.clone());

    if matches.get_flag("run") {
        println!("{}", "Running one monitor cycle...".cyan());
        match dashboard.trigger_run() {
            Ok(report) => println!("{}\n", format_report(&report)),
            Err(e) => println!("{} {}\n", "Cycle failed:".red().bold(), e),
        }
    }

    println!("\n{}", "HOST MONITOR STATUS".bold().bright_cyan());
    println!("{}", "=".repeat(80));

    let state = dashboard.state();
    println!("\n{}", "Last sample".bold());
    match state.last_sample {
        Some(ref sample) => {
            println!("  Taken    {}", format_time(sample.timestamp));
            println!("{}", format_sample(sample, &config.thresholds));
        }
        None => println!("  {}", "No cycle has completed yet".dimmed()),
    }

    println!("\n{}", "Log scan".bold());
    println!("  File     {}", config.log_file.display());
    println!("  Offset   {}", state.log_offset);
    println!("  Patterns {}", config.patterns().join(", "));

    let history = dashboard.history(HISTORY_POINTS)?;
    if !history.is_empty() {
        println!("\n{}", "Recent snapshots".bold());
        let limits = &config.thresholds;
        for point in &history {
            println!(
                "  {}  CPU {}  MEM {}  DISK {}",
                point.timestamp.dimmed(),
                format_percent(point.cpu_percent, limits.limit(Metric::Cpu)),
                format_percent(point.mem_percent, limits.limit(Metric::Memory)),
                format_percent(point.disk_percent, limits.limit(Metric::Disk)),
            );
        }
    }

    let warnings = dashboard.warnings(10)?;
    if !warnings.is_empty() {
        println!("\n{}", "Recent warnings".bold().yellow());
        for line in &warnings {
            println!("  {}", line);
        }
    }

    println!(
        "\n{} {}",
        "Operational log".bold(),
        format!("({})", config.ops_log_path().display()).dimmed()
    );
    for line in dashboard.tail_log(lines)? {
        println!("  {}", line.dimmed());
    }

    Ok(())
}
