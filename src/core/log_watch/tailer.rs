use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{MonitorError, Result};

/// Largest chunk read from the log in one cycle; the rest waits for the next cycle
pub const DEFAULT_MAX_BYTES: u64 = 200_000;

/// Outcome of one bounded read from a log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailRead {
    pub lines: Vec<String>,
    /// Byte position the next read starts from
    pub new_offset: u64,
    /// The saved offset was past the end of the file and reading restarted at 0
    pub rotated: bool,
    /// The file does not exist
    pub missing: bool,
}

impl TailRead {
    fn missing() -> Self {
        Self {
            missing: true,
            ..Default::default()
        }
    }
}

/// Reads newly appended log content with a per-call byte cap
#[derive(Debug, Clone, Copy)]
pub struct LogTailer {
    max_bytes: u64,
}

impl LogTailer {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn read_new(&self, path: &Path, from_offset: u64) -> Result<TailRead> {
        read_new(path, from_offset, self.max_bytes)
    }
}

impl Default for LogTailer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

/// Read up to `max_bytes` starting at `from_offset`.
///
/// A missing file yields no lines and offset 0. An offset past the end of
/// the file (truncation or rotation) restarts at byte 0. Invalid UTF-8 is
/// replaced with U+FFFD. A trailing partial line is returned and consumed,
/// so `new_offset` is always exactly `start + bytes read`.
pub fn read_new(path: &Path, from_offset: u64, max_bytes: u64) -> Result<TailRead> {
    let access = |source: io::Error| MonitorError::LogAccess {
        path: path.to_path_buf(),
        source,
    };

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TailRead::missing()),
        Err(e) => return Err(access(e)),
    };

    let size = file.metadata().map_err(access)?.len();
    let rotated = from_offset > size;
    let start = if rotated { 0 } else { from_offset };

    file.seek(SeekFrom::Start(start)).map_err(access)?;

    let mut data = Vec::new();
    file.take(max_bytes)
        .read_to_end(&mut data)
        .map_err(access)?;

    let lines = String::from_utf8_lossy(&data)
        .lines()
        .map(str::to_string)
        .collect();

    Ok(TailRead {
        lines,
        new_offset: start + data.len() as u64,
        rotated,
        missing: false,
    })
}
