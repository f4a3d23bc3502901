//! Incremental log scanning.
//!
//! [`LogTailer`] reads whatever was appended to a log file since the last
//! saved offset; [`PatternScanner`] picks out the lines worth alerting on.

mod scanner;
mod tailer;

pub use scanner::{LogFinding, LogMatch, PatternScanner, DEFAULT_PATTERNS};
pub use tailer::{read_new, LogTailer, TailRead, DEFAULT_MAX_BYTES};
