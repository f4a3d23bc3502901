use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::core::log_watch::LogFinding;
use crate::core::system_monitor::{Breach, MetricsSample};
use crate::error::DispatchError;

use super::channels::NotificationTransport;

/// Most matched log lines included in an alert body
pub const MAX_ALERT_LINES: usize = 50;
/// Matched lines quoted inline in the alert summary
pub const PREVIEW_LINES: usize = 3;

/// A composed notification
#[derive(Debug, Clone)]
pub struct Alert {
    pub subject: String,
    pub body: String,
    pub target: String,
    pub created_at: DateTime<Local>,
    /// Summary lines also written to the operational log
    pub summary: Vec<String>,
}

/// Formats alerts and delivers them through a transport, with a time limit
pub struct AlertDispatcher {
    transport: Arc<dyn NotificationTransport>,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(transport: Arc<dyn NotificationTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Build the alert for this cycle, or `None` if there is nothing to report
    pub fn compose(
        &self,
        subject: &str,
        sample: &MetricsSample,
        breaches: &[Breach],
        finding: &LogFinding,
    ) -> Option<Alert> {
        if breaches.is_empty() && finding.is_empty() {
            return None;
        }

        let created_at = Local::now();

        let mut summary: Vec<String> = breaches.iter().map(|b| b.to_string()).collect();
        if !finding.is_empty() {
            let preview: Vec<&str> = finding.lines().take(PREVIEW_LINES).collect();
            summary.push(format!(
                "Found {} matching log lines (examples: {:?})",
                finding.total(),
                preview
            ));
        }

        let mut body = vec![
            format!("Timestamp: {}", created_at.format("%a %b %e %H:%M:%S %Y")),
            sample.to_string(),
            "Alerts:".to_string(),
        ];
        body.extend(summary.iter().cloned());

        if !finding.is_empty() {
            body.push(String::new());
            body.push("Recent matching log lines:".to_string());
            body.extend(finding.lines().take(MAX_ALERT_LINES).map(str::to_string));
            if finding.total() > MAX_ALERT_LINES {
                body.push(format!(
                    "... {} more not shown",
                    finding.total() - MAX_ALERT_LINES
                ));
            }
        }

        Some(Alert {
            subject: subject.to_string(),
            body: body.join("\n"),
            target: self.transport.target(),
            created_at,
            summary,
        })
    }

    /// Deliver an alert.
    ///
    /// The transport runs on a worker thread; if it has not finished within
    /// the timeout the call returns `DispatchError::Timeout` and the worker is
    /// left to finish or fail on its own.
    pub fn send(&self, alert: &Alert) -> Result<(), DispatchError> {
        let (tx, rx) = mpsc::channel();
        let transport = Arc::clone(&self.transport);
        let subject = alert.subject.clone();
        let body = alert.body.clone();

        thread::Builder::new()
            .name("alert-dispatch".to_string())
            .spawn(move || {
                let _ = tx.send(transport.send(&subject, &body));
            })
            .map_err(|e| DispatchError::transport(format!("cannot start dispatch worker: {}", e)))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(DispatchError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(DispatchError::transport(format!(
                "{} transport stopped without a result",
                self.transport.name()
            ))),
        }
    }
}
