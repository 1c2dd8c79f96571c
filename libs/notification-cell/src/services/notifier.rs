use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use shared_config::AppConfig;

use crate::models::NotificationError;
use crate::services::twilio::TwilioWhatsAppNotifier;

/// Delivers a text message to the administrative channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotificationError>;
}

/// Stands in for the WhatsApp channel when Twilio credentials are absent.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        info!("Notification channel disabled, dropping message: {}", message);
        Ok(())
    }
}

pub fn notifier_from_config(config: &AppConfig) -> Arc<dyn Notifier> {
    match TwilioWhatsAppNotifier::new(config) {
        Ok(notifier) => Arc::new(notifier),
        Err(_) => {
            warn!("Twilio not configured, admin notifications are disabled");
            Arc::new(DisabledNotifier)
        }
    }
}
