//! A client for sending notifications to a Discord webhook.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

use super::{post_json, Notifier};
use crate::error::DeliveryError;

/// Discord rejects message content longer than this many characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Posts messages to a Discord webhook as `{"content": ...}`, split into
/// ordered chunks of at most [`DISCORD_MESSAGE_LIMIT`] characters.
pub struct DiscordNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    /// Creates a new `DiscordNotifier`. The URL is not validated until the
    /// first delivery.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

/// Splits `message` into consecutive substrings of at most `limit` characters.
///
/// Concatenating the chunks yields `message` exactly. Splits fall on `char`
/// boundaries, never inside a code point. A `limit` of zero leaves the
/// message unsplit.
pub fn chunk_message(message: &str, limit: usize) -> Vec<&str> {
    if limit == 0 {
        return if message.is_empty() { Vec::new() } else { vec![message] };
    }

    let mut chunks = Vec::with_capacity(message.len() / limit + 1);
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in message.char_indices() {
        if count == limit {
            chunks.push(&message[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < message.len() {
        chunks.push(&message[start..]);
    }
    chunks
}

#[async_trait]
impl Notifier for DiscordNotifier {
    #[instrument(skip_all, fields(backend = "discord", len = message.len()))]
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        if message.is_empty() {
            return Ok(());
        }

        let chunks = chunk_message(message, DISCORD_MESSAGE_LIMIT);
        let total = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let payload = json!({ "content": chunk });
            // Stop at the first failure; later chunks are never sent.
            post_json(&self.client, &self.webhook_url, &payload).await?;
            debug!(chunk = i + 1, total, "Delivered notification chunk to Discord.");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}
