// hostwatch library - public API

// Re-export error types
pub mod error;
pub use error::{DispatchError, MonitorError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::MonitorConfig;

use anyhow::Context;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Initialize logging.
///
/// Lines look like `2026-10-19 10:00:00,123 WARNING: message`. With `ops_log`
/// set they are appended to that file, otherwise they go to stderr. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging(ops_log: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Warn => "WARNING",
                other => other.as_str(),
            };
            writeln!(
                buf,
                "{} {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                level,
                record.args()
            )
        });

    if let Some(path) = ops_log {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open operational log: {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialize logging")
}
