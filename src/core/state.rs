//! Persisted run state.
//!
//! The state file is the only record of how far the log has been scanned,
//! so it is always replaced atomically: written to a sibling `.tmp` file,
//! synced, then renamed over the old one.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::system_monitor::MetricsSample;
use crate::error::{MonitorError, Result};

/// What survives between cycles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Byte offset into the monitored log file
    #[serde(default, alias = "log_pos")]
    pub log_offset: u64,
    #[serde(default, alias = "last_snapshot")]
    pub last_sample: Option<MetricsSample>,
}

/// Loads and saves [`RunState`] at a fixed path
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state; `Ok(None)` when no state file exists yet
    pub fn try_load(&self) -> Result<Option<RunState>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MonitorError::state_corruption(format!(
                    "cannot read {:?}: {}",
                    self.path, e
                )))
            }
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| MonitorError::state_corruption(format!("{:?}: {}", self.path, e)))
    }

    /// Load the state, falling back to an empty one if it is absent or unreadable
    pub fn load(&self) -> RunState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => RunState::default(),
            Err(e) => {
                log::warn!("{}; starting from an empty state", e);
                RunState::default()
            }
        }
    }

    /// Atomically replace the state file
    pub fn save(&self, state: &RunState) -> Result<()> {
        self.write_atomic(state).map_err(|source| MonitorError::StateWrite {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomic(&self, state: &RunState) -> io::Result<()> {
        let tmp_path = tmp_path_for(&self.path);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(state).map_err(io::Error::other)?;

        let result = (|| {
            {
                let mut file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&tmp_path)?;
                file.write_all(&json)?;
                file.sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "state".into());
    name.push(".tmp");
    path.with_file_name(name)
}
