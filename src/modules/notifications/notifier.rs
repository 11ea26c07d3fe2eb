use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::core::Result;

/// Plain-text e-mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Outbound customer messaging
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    /// Transport name, used in logs
    fn name(&self) -> &str;
}

/// Writes messages to the log instead of delivering them.
/// Used when no SMTP relay is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Notification (log only)"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
