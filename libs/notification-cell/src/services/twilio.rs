use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{NotificationError, TwilioMessageResponse};
use crate::services::notifier::Notifier;

/// Sends WhatsApp messages through Twilio's Messages API
/// POST /Accounts/{AccountSid}/Messages.json
#[derive(Debug)]
pub struct TwilioWhatsAppNotifier {
    client: Client,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
    base_url: String,
}

impl TwilioWhatsAppNotifier {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_notification_configured() {
            return Err(NotificationError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from: whatsapp_address(&config.twilio_from),
            to: whatsapp_address(&config.admin_whatsapp_to),
            base_url: config.twilio_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Notifier for TwilioWhatsAppNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        let url = format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid);
        debug!("Sending WhatsApp message via {}", url);

        let params = [
            ("From", self.from.as_str()),
            ("To", self.to.as_str()),
            ("Body", message),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Twilio message creation failed: {} - {}", status, response_text);
            return Err(NotificationError::Provider {
                status: status.as_u16(),
                message: response_text,
            });
        }

        match serde_json::from_str::<TwilioMessageResponse>(&response_text) {
            Ok(sent) => info!("WhatsApp message sent: {}", sent.sid),
            Err(e) => debug!("Message accepted but response was unreadable: {}", e),
        }

        Ok(())
    }
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}
