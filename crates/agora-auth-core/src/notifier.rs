//! Verification email dispatch
//!
//! Registration hands the raw verification token to a [`Notifier`] and
//! moves on. [`QueuedNotifier`] pushes it onto a channel drained by a
//! background worker, so delivery never runs inside the request and its
//! failures are only logged.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Pending verification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMessage {
    pub recipient: String,
    pub token: String,
}

/// Fire-and-forget sink for verification tokens
pub trait Notifier: Send + Sync {
    fn enqueue(&self, recipient: &str, token: &str);
}

/// Mail delivery error
#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Mailer that writes messages to the log
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(%to, %subject, %body, "outbound email");
        Ok(())
    }
}

/// Link a user follows to confirm their email
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!(
        "{}/auth/verify-email?token={}",
        base_url.trim_end_matches('/'),
        token
    )
}

/// Notifier backed by an mpsc queue and a spawned delivery worker
#[derive(Debug, Clone)]
pub struct QueuedNotifier {
    tx: mpsc::Sender<VerificationMessage>,
}

impl QueuedNotifier {
    /// Queue depth before new messages are dropped
    pub const CAPACITY: usize = 1024;

    /// Spawn the delivery worker on the current runtime.
    ///
    /// The worker stops once every `QueuedNotifier` clone is dropped.
    pub fn spawn<M: Mailer>(mailer: M, base_url: impl Into<String>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<VerificationMessage>(Self::CAPACITY);
        let base_url = base_url.into();

        let worker = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let link = verification_link(&base_url, &message.token);
                let body = format!("Confirm your email address by following this link: {link}");
                if let Err(e) = mailer
                    .send(&message.recipient, "Confirm your email", &body)
                    .await
                {
                    tracing::warn!(recipient = %message.recipient, error = %e, "verification email not delivered");
                }
            }
            tracing::debug!("notifier worker stopped");
        });

        (Self { tx }, worker)
    }
}

impl Notifier for QueuedNotifier {
    fn enqueue(&self, recipient: &str, token: &str) {
        let message = VerificationMessage {
            recipient: recipient.to_string(),
            token: token.to_string(),
        };
        if let Err(e) = self.tx.try_send(message) {
            tracing::warn!(%recipient, error = %e, "verification email dropped");
        }
    }
}
