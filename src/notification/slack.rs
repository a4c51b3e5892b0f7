//! A client for sending notifications to a Slack incoming webhook.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

use super::{post_json, Notifier};
use crate::error::DeliveryError;

/// Posts each message to a Slack webhook as `{"text": ...}` in one request.
///
/// Messages are not split. One that exceeds Slack's own limit comes back as
/// a [`DeliveryError`].
pub struct SlackNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Creates a new `SlackNotifier`. The URL is not validated until the
    /// first delivery.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    #[instrument(skip_all, fields(backend = "slack", len = message.len()))]
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        if message.is_empty() {
            return Ok(());
        }

        let payload = json!({ "text": message });
        post_json(&self.client, &self.webhook_url, &payload).await?;
        debug!("Delivered notification to Slack.");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
