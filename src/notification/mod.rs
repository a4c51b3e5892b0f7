//! Delivery of rendered log lines to chat webhooks.
//!
//! A [`Notifier`] sends one plain-text message to an external channel. Two
//! backends exist, [`SlackNotifier`] and [`DiscordNotifier`]; at most one is
//! active per logger, chosen once from configuration.

pub mod discord;
pub mod slack;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::{NotificationConfig, NotificationType};
use crate::error::{ConfigError, DeliveryError};
use crate::level::Severity;

pub use discord::DiscordNotifier;
pub use slack::SlackNotifier;

/// Environment variable probed first by `type = "auto"`.
pub const SLACK_WEBHOOK_URL_ENV: &str = "SLACK_WEBHOOK_URL";
/// Environment variable probed second by `type = "auto"`.
pub const DISCORD_WEBHOOK_URL_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Threshold used when the configuration names none.
pub const DEFAULT_NOTIFICATION_LEVEL: Severity = Severity::Warn;

/// A capability that delivers a plain-text message to a chat channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `message`. An empty message is a no-op.
    async fn notify(&self, message: &str) -> Result<(), DeliveryError>;

    /// A short name for diagnostics.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// The notification threshold and the backend, if one is active.
///
/// Established once when the logger is built; never mutated afterwards.
#[derive(Clone)]
pub struct NotificationSettings {
    pub level: Severity,
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl NotificationSettings {
    /// No backend, default threshold.
    pub fn disabled() -> Self {
        Self {
            level: DEFAULT_NOTIFICATION_LEVEL,
            notifier: None,
        }
    }

    /// Resolves the settings, reading webhook URLs for `auto` from the
    /// process environment.
    pub fn from_config(config: Option<&NotificationConfig>) -> Result<Self, ConfigError> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    /// Resolves the settings with an explicit environment lookup.
    ///
    /// The threshold is validated before anything else, so an invalid level
    /// fails even when no backend would be selected.
    pub fn resolve<F>(config: Option<&NotificationConfig>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(config) = config else {
            return Ok(Self::disabled());
        };

        let level = match &config.level {
            Some(level) => level.parse::<Severity>()?,
            None => DEFAULT_NOTIFICATION_LEVEL,
        };

        let lookup = |key: &str| env(key).filter(|url| !url.trim().is_empty());
        let explicit_url = || {
            config
                .webhook_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::MissingWebhookUrl(config.kind))
        };

        let notifier: Option<Arc<dyn Notifier>> = match config.kind {
            NotificationType::Auto => {
                if let Some(url) = lookup(SLACK_WEBHOOK_URL_ENV) {
                    Some(Arc::new(SlackNotifier::new(url)))
                } else if let Some(url) = lookup(DISCORD_WEBHOOK_URL_ENV) {
                    Some(Arc::new(DiscordNotifier::new(url)))
                } else {
                    None
                }
            }
            NotificationType::Slack => Some(Arc::new(SlackNotifier::new(explicit_url()?))),
            NotificationType::Discord => Some(Arc::new(DiscordNotifier::new(explicit_url()?))),
            NotificationType::Unknown => None,
        };

        debug!(
            kind = %config.kind,
            backend = notifier.as_ref().map_or("none", |n| n.name()),
            level = %level,
            "Resolved notification settings"
        );

        Ok(Self { level, notifier })
    }

    /// Returns `true` if a record of `severity` should be forwarded.
    pub fn should_notify(&self, severity: Severity) -> bool {
        self.notifier.is_some() && severity.is_enabled(self.level)
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for NotificationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationSettings")
            .field("level", &self.level)
            .field("notifier", &self.notifier.as_ref().map(|n| n.name()))
            .finish()
    }
}

/// POSTs `payload` as JSON and maps any non-2xx response to an error.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    webhook_url: &str,
    payload: &Value,
) -> Result<(), DeliveryError> {
    let response = client.post(webhook_url).json(payload).send().await?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, body = %body, "Webhook rejected notification");
    Err(DeliveryError::Status { status, body })
}
