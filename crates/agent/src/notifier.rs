//! Alert delivery via SMTP.
//!
//! [`AlertSink`] is what the monitor cycle hands a formatted
//! [`AlertEvent`] to. [`EmailNotifier`] is the production sink: it wraps
//! the `lettre` async SMTP transport and submits one plain-text email per
//! alert to a single fixed recipient.
//!
//! Sending is attempted exactly once per alert. Retrying is the next
//! cycle's job.

use std::time::Duration;

use async_trait::async_trait;
use hostwatch_core::AlertEvent;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, TlsMode};

/// Default upper bound on a whole SMTP submission (connect, TLS, auth, send).
///
/// `lettre`'s own timeout applies to each socket operation separately, so a
/// server that answers slowly enough can keep a session alive well past it.
/// [`EmailNotifier`] wraps the submission in this deadline as well.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for alert delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The submission did not finish within the notifier's send timeout.
    #[error("SMTP send timed out after {0:?}")]
    Timeout(Duration),

    /// Delivery failed in a non-SMTP sink.
    #[error("Alert delivery failed: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// AlertSink
// ---------------------------------------------------------------------------

/// Destination for alert notifications.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, alert: &AlertEvent) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: AlertSink + ?Sized> AlertSink for std::sync::Arc<T> {
    async fn send(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        (**self).send(alert).await
    }
}

// ---------------------------------------------------------------------------
// EmailNotifier
// ---------------------------------------------------------------------------

/// Sends alert emails over an authenticated, encrypted SMTP connection.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    send_timeout: Duration,
}

impl EmailNotifier {
    /// Build the SMTP transport and validate both addresses up front so that
    /// misconfiguration surfaces at startup rather than on the first alert.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let builder = match config.tls {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(SEND_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            from: config.from_address.parse()?,
            to: config.to_address.parse()?,
            send_timeout: SEND_TIMEOUT,
        })
    }

    /// Override the deadline for a whole submission (default [`SEND_TIMEOUT`]).
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Assemble the MIME message for `alert`.
    pub fn build_message(&self, alert: &AlertEvent) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl AlertSink for EmailNotifier {
    async fn send(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        let message = self.build_message(alert)?;
        tokio::time::timeout(self.send_timeout, self.transport.send(message))
            .await
            .map_err(|_| NotifyError::Timeout(self.send_timeout))??;

        tracing::info!(to = %self.to, breaches = alert.breaches.len(), "Alert email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
