use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

use hostwatch::commands;
use hostwatch::core::MonitorConfig;

fn build_cli() -> Command {
    Command::new("hostwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Host health monitor: resource thresholds, log scanning and email alerts")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the JSON configuration file (required)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Run one monitoring cycle and exit")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("interval"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .value_name("SECONDS")
                .help("Run a cycle every N seconds until interrupted (0 = run once)")
                .value_parser(clap::value_parser!(u64)),
        )
        .subcommand(
            Command::new("status")
                .about("Show last sample, scan position, recent warnings and the operational log")
                .arg(
                    Arg::new("lines")
                        .short('n')
                        .long("lines")
                        .value_name("N")
                        .help("Number of operational log lines to show")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    Arg::new("run")
                        .long("run")
                        .help("Run one monitoring cycle before showing the status")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}

/// `--config` may be given before or after the subcommand
fn config_path(matches: &ArgMatches) -> Option<PathBuf> {
    matches
        .subcommand()
        .and_then(|(_, sub)| sub.get_one::<PathBuf>("config"))
        .or_else(|| matches.get_one::<PathBuf>("config"))
        .cloned()
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let path = config_path(&matches).context("--config PATH is required")?;
    let config = MonitorConfig::load(&path)?;

    hostwatch::init_logging(Some(&config.ops_log_path()))?;
    log::info!("Starting monitor with config {:?}", path);

    match matches.subcommand() {
        Some(("status", sub_matches)) => commands::status::execute(&config, sub_matches),
        _ => commands::run::execute(&config, &matches),
    }
}
