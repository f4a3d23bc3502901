//! Notification transports (SMTP, operational log).

use std::time::Duration;

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::core::config::SmtpConfig;
use crate::error::DispatchError;

/// Something that can deliver an alert.
///
/// Implementations are called from a worker thread so the dispatcher can
/// bound the call with a timeout.
pub trait NotificationTransport: Send + Sync {
    /// Short channel name for logs.
    fn name(&self) -> &str;

    /// Human-readable description of where alerts go.
    fn target(&self) -> String;

    /// Deliver one message.
    fn send(&self, subject: &str, body: &str) -> Result<(), DispatchError>;
}

/// Email over SMTP, optionally upgraded with STARTTLS.
pub struct SmtpNotifier {
    config: SmtpConfig,
    timeout: Duration,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, DispatchError> {
        let from: Mailbox = self.config.from.parse().map_err(|e| {
            DispatchError::message(format!("invalid from address {:?}: {}", self.config.from, e))
        })?;

        let mut builder = Message::builder()
            .from(from)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for addr in self.config.to.addresses() {
            let to: Mailbox = addr.parse().map_err(|e| {
                DispatchError::message(format!("invalid recipient {:?}: {}", addr, e))
            })?;
            builder = builder.to(to);
        }

        builder
            .body(body.to_string())
            .map_err(|e| DispatchError::message(e.to_string()))
    }

    fn mailer(&self) -> Result<SmtpTransport, DispatchError> {
        let builder = if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.server)
                .map_err(|e| DispatchError::transport(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.server)
        };

        let mut builder = builder
            .port(self.config.effective_port())
            .timeout(Some(self.timeout));

        if let Some(ref username) = self.config.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                self.config.password.clone().unwrap_or_default(),
            ));
        }

        Ok(builder.build())
    }
}

impl NotificationTransport for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn target(&self) -> String {
        self.config.to.addresses().join(",")
    }

    fn send(&self, subject: &str, body: &str) -> Result<(), DispatchError> {
        let message = self.build_message(subject, body)?;

        self.mailer()?
            .send(&message)
            .map(|_| ())
            .map_err(|e| DispatchError::transport(e.to_string()))
    }
}

/// Writes alerts to the operational log; used when no SMTP target is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationTransport for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn target(&self) -> String {
        "operational log".to_string()
    }

    fn send(&self, subject: &str, body: &str) -> Result<(), DispatchError> {
        let flattened: Vec<&str> = body.lines().filter(|l| !l.is_empty()).collect();
        log::warn!("ALERT {}: {}", subject, flattened.join(" | "));
        Ok(())
    }
}
