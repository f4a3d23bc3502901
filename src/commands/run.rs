use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use std::time::Duration;

use crate::core::{MonitorConfig, Scheduler};
use crate::ui::format_report;

/// Run the monitor once, or every `--interval` seconds until Ctrl+C
pub fn execute(config: &MonitorConfig, matches: &ArgMatches) -> Result<()> {
    let interval = matches.get_one::<u64>("interval").copied().unwrap_or(0);
    let once = matches.get_flag("once");

    let mut scheduler = Scheduler::from_config(config);

    if once || interval == 0 {
        // A failed cycle is logged by the scheduler and does not change the exit code
        match scheduler.run_once() {
            Ok(report) => println!("{}", format_report(&report)),
            Err(e) => eprintln!("{} {}", "Monitor cycle failed:".red().bold(), e),
        }
        return Ok(());
    }

    let signal = scheduler.shutdown_signal();
    ctrlc::set_handler(move || {
        println!();
        println!("{}", "Stopping after the current cycle...".yellow().bold());
        signal.trigger();
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    println!(
        "{}",
        format!("Monitoring every {}s. Press Ctrl+C to stop.", interval).cyan()
    );

    let cycles = scheduler.run_loop(Duration::from_secs(interval));
    println!("{}", format!("Stopped after {} cycle(s).", cycles).dimmed());

    Ok(())
}
