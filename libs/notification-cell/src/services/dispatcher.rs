use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::models::NotificationError;
use crate::services::notifier::Notifier;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Runs notifier calls off the request path. Failures end in the log and are
/// never reported back to the operation that triggered them.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    attempt_timeout: Duration,
    max_attempts: u32,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, attempt_timeout: Duration, max_attempts: u32) -> Self {
        Self {
            notifier,
            attempt_timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(notifier: Arc<dyn Notifier>, config: &AppConfig) -> Self {
        Self::new(
            notifier,
            Duration::from_secs(config.notify_timeout_secs),
            config.notify_max_attempts,
        )
    }

    /// Spawns delivery and returns at once. Callers on the request path drop
    /// the handle.
    pub fn dispatch(&self, message: String) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.deliver(&message).await {
                error!("Failed to deliver admin notification: {}", e);
            }
        })
    }

    async fn deliver(&self, message: &str) -> Result<(), NotificationError> {
        let mut attempt = 1;
        loop {
            let result = match timeout(self.attempt_timeout, self.notifier.send(message)).await {
                Ok(result) => result,
                Err(_) => Err(NotificationError::Timeout {
                    timeout_seconds: self.attempt_timeout.as_secs(),
                }),
            };

            match result {
                Ok(()) => {
                    debug!("Notification delivered on attempt {}", attempt);
                    return Ok(());
                }
                Err(NotificationError::NotConfigured) => return Err(NotificationError::NotConfigured),
                Err(e) if attempt < self.max_attempts => {
                    warn!("Notification attempt {} of {} failed: {}", attempt, self.max_attempts, e);
                    sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
