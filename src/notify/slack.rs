// src/notify/slack.rs
use std::time::Duration;

use reqwest::Client;

use super::Notifier;
use crate::error::DeliveryError;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Incoming-webhook poster. One attempt per message; failures surface as
/// [`DeliveryError`] and are not retried.
pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        let body = serde_json::json!({ "text": message });

        let resp = self
            .client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
