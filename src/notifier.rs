//! Notification port. Delivery is fire-and-forget from the engine's point of
//! view: it runs strictly after the authoritative state change has committed,
//! and a failure is logged, never surfaced or retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        to_employee_id: u64,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError>;
}

/// Default backend: writes the notification to the log. The actual transport
/// (email etc.) is an external collaborator wired in by the service layer.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        to_employee_id: u64,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(to_employee_id, subject, body, "notification");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub to_employee_id: u64,
    pub subject: String,
    pub body: String,
}

/// Test double: records deliveries and can be switched into a failing mode.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        to_employee_id: u64,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("transport down".into()));
        }
        self.sent.lock().await.push(SentNotification {
            to_employee_id,
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
