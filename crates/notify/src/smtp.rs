//! SMTP delivery.
//!
//! The transport is constructed once at startup and injected; there is no
//! process-global transporter. Sends are spawned onto the runtime so the
//! triggering request never waits on the mail server.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::template::render;
use crate::{Notification, Notifier};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address for all outbound mail.
    pub from: String,
}

#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("invalid mailbox address: {0}")]
    Address(String),

    #[error("smtp transport: {0}")]
    Transport(String),
}

/// Lettre-backed notifier.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| SmtpError::Address(format!("{}: {e}", config.from)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| SmtpError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    /// Render and deliver one notification, awaiting the transport. Used by
    /// `dispatch` from a spawned task.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), SmtpError> {
        let recipient = notification.recipient();
        let to: Mailbox = recipient
            .email
            .parse()
            .map_err(|e| SmtpError::Address(format!("{}: {e}", recipient.email)))?;

        let mail = render(notification);
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject)
            .body(mail.body)
            .map_err(|e| SmtpError::Transport(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| SmtpError::Transport(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn dispatch(&self, notification: Notification) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(&notification).await {
                tracing::warn!(
                    recipient = %notification.recipient().email,
                    error = %e,
                    "notification delivery failed"
                );
            }
        });
    }
}

/// Notifier used when no SMTP configuration is present: logs and drops.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn dispatch(&self, notification: Notification) {
        tracing::info!(
            recipient = %notification.recipient().email,
            "mail transport not configured; notification dropped"
        );
    }
}
