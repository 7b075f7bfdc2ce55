use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::MessagingConfig;
use crate::error::{MessagingError, SetupError};
use crate::messaging::{DeliveryReceipt, Messenger};

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Sends WhatsApp messages through the Twilio Messages API
pub struct TwilioMessenger {
    client: Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioMessenger {
    pub fn new(config: &MessagingConfig) -> Result<Self, SetupError> {
        let account_sid = config
            .account_sid
            .clone()
            .ok_or(SetupError::MissingCredential("TWILIO_ACCOUNT_SID"))?;
        let auth_token = config
            .auth_token
            .clone()
            .ok_or(SetupError::MissingCredential("TWILIO_AUTH_TOKEN"))?;

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            account_sid,
            auth_token,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn deliver(
        &self,
        to: &str,
        from: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, MessagingError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::Rejected { status, body });
        }

        let response_body: Value = response.json().await?;
        debug!("Twilio response: {:?}", response_body);

        let id = response_body["sid"]
            .as_str()
            .ok_or_else(|| MessagingError::InvalidResponse("missing message sid".to_string()))?;

        Ok(DeliveryReceipt { id: id.to_string() })
    }
}
