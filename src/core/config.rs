use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::log_watch::{DEFAULT_MAX_BYTES, DEFAULT_PATTERNS};
use crate::core::system_monitor::Thresholds;
use crate::error::MonitorError;

pub const DEFAULT_LOG_FILE: &str = "/var/log/syslog";
pub const DEFAULT_ALERT_SUBJECT: &str = "ALERT: Linux Monitor";
const DEFAULT_CPU_SAMPLE_MS: u64 = 1000;
const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 10;
const STATE_FILE_NAME: &str = "monitor_state.json";
const OPS_LOG_FILE_NAME: &str = "monitor.log";

/// Monitor configuration, loaded from a JSON file.
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// `None` means "use the built-in pattern set"
    #[serde(default)]
    pub log_patterns: Option<Vec<String>>,
    #[serde(default = "default_log_max_bytes")]
    pub log_max_bytes: u64,
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub ops_log_file: Option<PathBuf>,
    #[serde(default = "default_alert_subject")]
    pub alert_subject: String,
    /// Filesystem whose usage is reported as `disk_percent`
    #[serde(default = "default_disk_path")]
    pub disk_path: PathBuf,
    #[serde(default = "default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

/// SMTP notification target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
    pub to: Recipients,
}

/// `"to"` accepts either a single address or a list of addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn addresses(&self) -> Vec<String> {
        match self {
            Recipients::One(addr) => vec![addr.clone()],
            Recipients::Many(addrs) => addrs.clone(),
        }
    }
}

impl SmtpConfig {
    /// Port to connect to, 587 for STARTTLS and 25 for plain SMTP unless set
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.use_tls { 587 } else { 25 })
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_log_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_alert_subject() -> String {
    DEFAULT_ALERT_SUBJECT.to_string()
}

fn default_disk_path() -> PathBuf {
    PathBuf::from("/")
}

fn default_cpu_sample_ms() -> u64 {
    DEFAULT_CPU_SAMPLE_MS
}

fn default_dispatch_timeout_secs() -> u64 {
    DEFAULT_DISPATCH_TIMEOUT_SECS
}

fn default_use_tls() -> bool {
    true
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            log_file: default_log_file(),
            log_patterns: None,
            log_max_bytes: default_log_max_bytes(),
            state_file: None,
            ops_log_file: None,
            alert_subject: default_alert_subject(),
            disk_path: default_disk_path(),
            cpu_sample_ms: default_cpu_sample_ms(),
            dispatch_timeout_secs: default_dispatch_timeout_secs(),
            smtp: None,
        }
    }
}

impl MonitorConfig {
    /// Load and validate the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::from_json(&data)
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        Ok(config)
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json(data: &str) -> Result<Self> {
        let config: MonitorConfig =
            serde_json::from_str(data).with_context(|| "Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), MonitorError> {
        for (name, limit) in self.thresholds.configured() {
            if !limit.is_finite() {
                return Err(MonitorError::config(format!(
                    "threshold {} must be a finite number",
                    name
                )));
            }
        }

        if self.log_max_bytes == 0 {
            return Err(MonitorError::config("log_max_bytes must be greater than 0"));
        }

        if self.dispatch_timeout_secs == 0 {
            return Err(MonitorError::config(
                "dispatch_timeout_secs must be greater than 0",
            ));
        }

        if let Some(ref smtp) = self.smtp {
            if smtp.server.trim().is_empty() {
                return Err(MonitorError::config("smtp.server must not be empty"));
            }
            if smtp.to.addresses().iter().all(|a| a.trim().is_empty()) {
                return Err(MonitorError::config("smtp.to must name at least one recipient"));
            }
        }

        Ok(())
    }

    /// Patterns to scan for; the built-in set when none are configured
    pub fn patterns(&self) -> Vec<String> {
        match self.log_patterns {
            Some(ref patterns) => patterns.clone(),
            None => DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| data_dir().join(STATE_FILE_NAME))
    }

    pub fn ops_log_path(&self) -> PathBuf {
        self.ops_log_file
            .clone()
            .unwrap_or_else(|| data_dir().join(OPS_LOG_FILE_NAME))
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    /// Copy of this configuration safe to show on a dashboard
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(ref mut smtp) = copy.smtp {
            if smtp.password.is_some() {
                smtp.password = Some("********".to_string());
            }
        }
        copy
    }
}

/// Per-user directory for the state file and operational log
fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("hostwatch"))
        .unwrap_or_else(|| PathBuf::from("."))
}
