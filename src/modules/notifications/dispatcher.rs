use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::notifier::{EmailMessage, Notifier};

/// Fire-and-forget delivery.
///
/// `emit` returns immediately; the send runs on its own task and a failure is
/// only logged. Callers emit after the ledger write has committed, so nothing
/// here can undo it.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    delivered: Arc<AtomicUsize>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            pending: Mutex::new(Vec::new()),
            delivered: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue `message` for delivery on a background task
    pub fn emit(&self, message: EmailMessage) {
        let notifier = self.notifier.clone();
        let delivered = self.delivered.clone();
        let handle = tokio::spawn(async move {
            if deliver(notifier.as_ref(), &message).await {
                delivered.fetch_add(1, Ordering::Relaxed);
            }
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Wait for every emitted message. Returns how many were delivered
    /// since the previous flush.
    pub async fn flush(&self) -> usize {
        let handles: Vec<_> = std::mem::take(&mut *self.pending.lock());

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Notification task aborted");
            }
        }
        self.delivered.swap(0, Ordering::Relaxed)
    }
}

/// Send once, never fail. Returns whether the message went out.
pub async fn deliver(notifier: &dyn Notifier, message: &EmailMessage) -> bool {
    match notifier.send(message).await {
        Ok(()) => {
            debug!(
                notifier = notifier.name(),
                to = %message.to,
                subject = %message.subject,
                "Notification sent"
            );
            true
        }
        Err(e) => {
            warn!(
                notifier = notifier.name(),
                to = %message.to,
                subject = %message.subject,
                error = %e,
                "Notification failed"
            );
            false
        }
    }
}
