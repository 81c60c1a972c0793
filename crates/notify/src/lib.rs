//! `mealbridge-notify` — account and session notifications.
//!
//! Notifications are strictly fire-and-forget from the caller's point of
//! view: `Notifier::dispatch` returns immediately, delivery happens in the
//! background, and failures are logged rather than surfaced. The state change
//! that triggered a notification is the durable fact; delivery is not
//! guaranteed.

pub mod smtp;
pub mod template;

pub use smtp::{NoopNotifier, SmtpConfig, SmtpNotifier};
pub use template::{render, RenderedMail};

use mealbridge_core::Role;

/// Recipient details carried into the templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Counterpart details for a started donation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetails {
    pub session_reference: String,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub receiver_name: String,
    pub receiver_email: String,
    pub receiver_phone: Option<String>,
    pub food_description: Option<String>,
    pub quantity: Option<String>,
}

/// The fixed set of outbound notifications.
///
/// The session-started variants currently have no caller (donation sessions
/// are not implemented) and exist as part of the interface contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Sent on approve and on enable.
    AccountApproved { recipient: Recipient },
    AccountBlocked { recipient: Recipient },
    SessionStartedDonor { recipient: Recipient, session: SessionDetails },
    SessionStartedReceiver { recipient: Recipient, session: SessionDetails },
}

impl Notification {
    pub fn recipient(&self) -> &Recipient {
        match self {
            Notification::AccountApproved { recipient }
            | Notification::AccountBlocked { recipient }
            | Notification::SessionStartedDonor { recipient, .. }
            | Notification::SessionStartedReceiver { recipient, .. } => recipient,
        }
    }
}

/// Outbound notification sink.
///
/// Implementations must never panic or block the caller on transport latency.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, notification: Notification);
}
