use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notifier not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Twilio API error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Notification timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}

/// The subset of Twilio's message resource we read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioMessageResponse {
    pub sid: String,
    pub status: Option<String>,
}
