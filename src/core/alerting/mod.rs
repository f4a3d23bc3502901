//! Alert composition and delivery.

mod channels;
mod dispatcher;

pub use channels::{LogNotifier, NotificationTransport, SmtpNotifier};
pub use dispatcher::{Alert, AlertDispatcher, MAX_ALERT_LINES, PREVIEW_LINES};
